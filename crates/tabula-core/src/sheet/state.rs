use crate::error::{Result, TabulaError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tabula_engine::engine::{CellLocation, Expression, MAX_COLUMNS, Parser};

/// A fixed-size grid of cells, each holding a formula and its value.
///
/// The formula is what has been written into a cell; the value is what that
/// formula evaluates to given the built-ins and every other cell's value.
/// Formulas and values only change through [`Sheet::update`], so readers
/// always observe a fully propagated state.
#[derive(Clone)]
pub struct Sheet {
    /// User-entered expression per cell
    pub(super) formulas: HashMap<CellLocation, Expression>,
    /// Evaluated expression per cell
    pub(super) values: HashMap<CellLocation, Expression>,
    /// Reverse dependency map: cell -> cells whose formula references it
    pub(super) dependents: HashMap<CellLocation, HashSet<CellLocation>>,
    /// Named values shared by every formula, fixed at construction
    pub(super) builtins: Arc<HashMap<String, Expression>>,
    pub(super) default_expression: Expression,
    pub(super) parser: Arc<dyn Parser>,
    pub(super) rows: usize,
    pub(super) columns: usize,
}

impl Sheet {
    /// Create a sheet with every cell populated by `default_expression`.
    ///
    /// Requires at least one row and between 1 and 26 columns.
    pub fn new(
        parser: Arc<dyn Parser>,
        builtins: Arc<HashMap<String, Expression>>,
        default_expression: Expression,
        rows: usize,
        columns: usize,
    ) -> Result<Self> {
        if rows == 0 || columns == 0 || columns > MAX_COLUMNS {
            return Err(TabulaError::InvalidDimensions { rows, columns });
        }

        let mut sheet = Sheet {
            formulas: HashMap::new(),
            values: HashMap::new(),
            dependents: HashMap::new(),
            builtins,
            default_expression,
            parser,
            rows,
            columns,
        };
        sheet.populate_all();
        Ok(sheet)
    }

    fn populate_all(&mut self) {
        for row in 0..self.rows {
            for column in 0..self.columns {
                self.populate(CellLocation::new(row, column));
            }
        }
    }

    fn populate(&mut self, location: CellLocation) {
        self.formulas
            .insert(location, self.default_expression.clone());
        self.values.insert(location, self.default_expression.clone());
        self.dependents.insert(location, HashSet::new());
    }

    /// Reset every cell to the default expression and drop all dependencies.
    /// Built-ins are kept.
    pub fn clear(&mut self) {
        self.populate_all();
    }

    /// Grow the sheet to `rows` x `columns`.
    ///
    /// Existing cells are kept. Formulas that referenced cells outside the old
    /// bounds are linked to the new cells and their values refreshed. If a
    /// refreshed value fails to evaluate, the sheet is left as it was.
    pub fn resize(&mut self, rows: usize, columns: usize) -> Result<()> {
        if rows < self.rows || columns < self.columns || columns > MAX_COLUMNS {
            return Err(TabulaError::InvalidDimensions { rows, columns });
        }

        let mut added = HashSet::new();
        for row in 0..rows {
            for column in 0..columns {
                let location = CellLocation::new(row, column);
                if !self.contains(&location) {
                    added.insert(location);
                }
            }
        }

        let mut grown = self.clone();
        grown.rows = rows;
        grown.columns = columns;
        for location in &added {
            grown.populate(*location);
        }

        // Link existing formulas to the cells that just came into bounds.
        let mut linked = HashSet::new();
        for (cell, formula) in &self.formulas {
            for target in grown.cell_dependencies(formula) {
                if added.contains(&target) {
                    if let Some(users) = grown.dependents.get_mut(&target) {
                        users.insert(*cell);
                    }
                    linked.insert(target);
                }
            }
        }

        if !linked.is_empty() {
            let sources: Vec<CellLocation> = linked.into_iter().collect();
            let staged = grown.stage_dependents(&sources).inspect_err(|e| {
                tracing::debug!(rows, columns, error = %e, "resize rolled back");
            })?;
            grown.values.extend(staged);
        }

        *self = grown;
        tracing::debug!(rows, columns, added = added.len(), "resized sheet");
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Whether the location lies inside the sheet.
    pub fn contains(&self, location: &CellLocation) -> bool {
        location.row < self.rows && location.column < self.columns
    }

    pub fn formula_at(&self, location: &CellLocation) -> Option<&Expression> {
        self.formulas.get(location)
    }

    pub fn value_at(&self, location: &CellLocation) -> Option<&Expression> {
        self.values.get(location)
    }

    pub fn default_expression(&self) -> &Expression {
        &self.default_expression
    }

    pub fn builtins(&self) -> &HashMap<String, Expression> {
        &self.builtins
    }

    /// In-bounds cell locations referenced by a formula. Built-in names and
    /// anything that does not parse as a location never count.
    pub(super) fn cell_dependencies(&self, formula: &Expression) -> Vec<CellLocation> {
        formula
            .dependencies()
            .iter()
            .filter_map(|identifier| CellLocation::parse(identifier))
            .filter(|location| self.contains(location))
            .collect()
    }

    /// Serialize the dimensions and every rendered formula.
    ///
    /// The first line is `rows|columns`; each following line is one row of
    /// formulas joined by `|`.
    pub fn encode(&self) -> String {
        let mut lines = vec![format!("{}|{}", self.rows, self.columns)];
        for row in 0..self.rows {
            let rendered: Vec<String> = (0..self.columns)
                .map(|column| {
                    self.formulas
                        .get(&CellLocation::new(row, column))
                        .map(Expression::render)
                        .unwrap_or_default()
                })
                .collect();
            lines.push(rendered.join("|"));
        }
        lines.join("\n")
    }
}
