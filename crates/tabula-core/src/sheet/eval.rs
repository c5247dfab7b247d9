//! Transactional recomputation of a cell and everything that depends on it.
//!
//! An update is computed in two phases. Staging evaluates the new formula and
//! every transitive dependent against a scratch symbol table, producing the
//! complete set of new values or an error; it never touches the sheet. Only
//! a successful staging is committed, so a failed update leaves every
//! formula and value exactly as it was.

use super::Sheet;
use crate::error::{Result, TabulaError};
use std::collections::{HashMap, HashSet};
use tabula_engine::engine::{CellLocation, Expression, SymbolTable};

/// New values keyed by the cell they belong to.
type Staged = HashMap<CellLocation, Expression>;

impl Sheet {
    /// Replace the formula at `location` and recompute every dependent cell.
    ///
    /// Either all affected values are updated or, on error, none are.
    pub fn update(&mut self, location: CellLocation, formula: Expression) -> Result<()> {
        let staged = match self.stage(location, &formula) {
            Ok(staged) => staged,
            Err(e) => {
                tracing::debug!(cell = %location, error = %e, "update rolled back");
                return Err(e);
            }
        };

        self.relink(location, &formula);
        self.formulas.insert(location, formula);
        let recomputed = staged.len();
        self.values.extend(staged);
        tracing::debug!(cell = %location, recomputed, "update committed");
        Ok(())
    }

    /// Parse `input` with the sheet's parser and apply it to `location`.
    pub fn set_cell_from_input(&mut self, location: CellLocation, input: &str) -> Result<()> {
        let formula = self.parser.parse(input)?;
        self.update(location, formula)
    }

    /// Every cell that directly or indirectly depends on `location`.
    pub fn used_by(&self, location: &CellLocation) -> HashSet<CellLocation> {
        let mut to_process = vec![*location];
        let mut visited = HashSet::new();
        while let Some(current) = to_process.pop() {
            if let Some(users) = self.dependents.get(&current) {
                for user in users {
                    if visited.insert(*user) {
                        to_process.push(*user);
                    }
                }
            }
        }
        visited
    }

    /// Scratch symbol table: built-ins plus every cell's committed value.
    fn create_state(&self) -> SymbolTable {
        let mut symbols: SymbolTable = self.builtins.as_ref().clone();
        for (location, value) in &self.values {
            symbols.insert(location.to_string(), value.clone());
        }
        symbols
    }

    fn stage(&self, location: CellLocation, formula: &Expression) -> Result<Staged> {
        if !self.contains(&location) {
            return Err(TabulaError::OutOfBounds(location));
        }
        self.check_cycle(location, formula)?;

        let mut symbols = self.create_state();
        let value = self.evaluate_formula(formula, &mut symbols)?;
        symbols.insert(location.to_string(), value.clone());

        let mut staged = Staged::from([(location, value)]);
        self.propagate(&[location], &mut symbols, &mut staged)?;
        Ok(staged)
    }

    /// Stage fresh values for every dependent of `sources` against the
    /// committed state.
    pub(super) fn stage_dependents(&self, sources: &[CellLocation]) -> Result<Staged> {
        let mut symbols = self.create_state();
        let mut staged = Staged::new();
        self.propagate(sources, &mut symbols, &mut staged)?;
        Ok(staged)
    }

    fn propagate(
        &self,
        sources: &[CellLocation],
        symbols: &mut SymbolTable,
        staged: &mut Staged,
    ) -> Result<()> {
        for dependent in self.evaluation_order(sources) {
            let Some(formula) = self.formulas.get(&dependent) else {
                continue;
            };
            let value = self.evaluate_formula(formula, symbols)?;
            symbols.insert(dependent.to_string(), value.clone());
            staged.insert(dependent, value);
        }
        Ok(())
    }

    /// Evaluate `formula`, first binding any non-canonical spelling of an
    /// in-bounds location it uses (`A01`) to that cell's current value.
    fn evaluate_formula(&self, formula: &Expression, symbols: &mut SymbolTable) -> Result<Expression> {
        for identifier in formula.dependencies() {
            let Some(location) = CellLocation::parse(&identifier) else {
                continue;
            };
            let canonical = location.to_string();
            if canonical == identifier || !self.contains(&location) {
                continue;
            }
            if let Some(value) = symbols.get(&canonical).cloned() {
                symbols.insert(identifier, value);
            }
        }
        Ok(formula.evaluate(symbols)?)
    }

    /// Transitive dependents of `sources`, each placed after all of its
    /// affected inputs (reverse depth-first postorder).
    fn evaluation_order(&self, sources: &[CellLocation]) -> Vec<CellLocation> {
        let mut visited = HashSet::new();
        let mut postorder = Vec::new();
        for source in sources {
            self.visit_dependents(source, &mut visited, &mut postorder);
        }
        postorder.reverse();
        postorder
    }

    fn visit_dependents(
        &self,
        current: &CellLocation,
        visited: &mut HashSet<CellLocation>,
        postorder: &mut Vec<CellLocation>,
    ) {
        let Some(users) = self.dependents.get(current) else {
            return;
        };
        for user in users {
            if visited.insert(*user) {
                self.visit_dependents(user, visited, postorder);
                postorder.push(*user);
            }
        }
    }

    /// Reject a formula whose cell references would lead back to `location`.
    fn check_cycle(&self, location: CellLocation, formula: &Expression) -> Result<()> {
        let referenced = self.cell_dependencies(formula);
        if referenced.is_empty() {
            return Ok(());
        }
        let users = self.used_by(&location);
        match referenced
            .into_iter()
            .find(|via| *via == location || users.contains(via))
        {
            Some(via) => Err(TabulaError::CircularReference {
                cell: location,
                via,
            }),
            None => Ok(()),
        }
    }

    /// Swap the old formula's dependency edges for the new formula's.
    fn relink(&mut self, location: CellLocation, formula: &Expression) {
        if let Some(old) = self.formulas.get(&location) {
            for target in self.cell_dependencies(old) {
                if let Some(users) = self.dependents.get_mut(&target) {
                    users.remove(&location);
                }
            }
        }
        for target in self.cell_dependencies(formula) {
            if let Some(users) = self.dependents.get_mut(&target) {
                users.insert(location);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::TabulaError;
    use crate::sheet::{Sheet, SheetBuilder};
    use std::collections::HashSet;
    use std::sync::Arc;
    use tabula_engine::engine::{
        CellLocation, Expression, Operator, SimpleParser, TypeError,
    };

    fn loc(name: &str) -> CellLocation {
        CellLocation::parse(name).unwrap()
    }

    fn builder() -> SheetBuilder {
        SheetBuilder::new(Arc::new(SimpleParser::new()), Expression::Empty)
    }

    fn sheet(rows: usize, columns: usize) -> Sheet {
        builder().empty(rows, columns).unwrap()
    }

    fn set(sheet: &mut Sheet, name: &str, input: &str) {
        sheet.set_cell_from_input(loc(name), input).unwrap();
    }

    fn value(sheet: &Sheet, name: &str) -> Expression {
        sheet.value_at(&loc(name)).cloned().unwrap()
    }

    fn snapshot(sheet: &Sheet) -> (Vec<Expression>, Vec<Expression>) {
        let mut formulas = Vec::new();
        let mut values = Vec::new();
        for row in 0..sheet.rows() {
            for column in 0..sheet.columns() {
                let location = CellLocation::new(row, column);
                formulas.push(sheet.formula_at(&location).cloned().unwrap());
                values.push(sheet.value_at(&location).cloned().unwrap());
            }
        }
        (formulas, values)
    }

    #[test]
    fn test_constant_update_sets_value() {
        let mut sheet = sheet(5, 3);
        sheet.update(loc("B2"), Expression::constant(12)).unwrap();
        assert_eq!(value(&sheet, "B2"), Expression::constant(12));
        assert_eq!(
            sheet.formula_at(&loc("B2")),
            Some(&Expression::constant(12))
        );
    }

    #[test]
    fn test_operator_formula_is_reduced() {
        let mut sheet = sheet(5, 3);
        set(&mut sheet, "A0", "3 * 4 - 2");
        assert_eq!(value(&sheet, "A0"), Expression::constant(10));
        assert_eq!(sheet.formula_at(&loc("A0")).unwrap().render(), "3 * 4 - 2");
    }

    #[test]
    fn test_reference_chain_converges_and_propagates() {
        let mut sheet = sheet(5, 3);
        set(&mut sheet, "C0", "7");
        set(&mut sheet, "B0", "C0");
        set(&mut sheet, "A0", "B0");
        for name in ["A0", "B0", "C0"] {
            assert_eq!(value(&sheet, name), Expression::constant(7));
        }

        set(&mut sheet, "C0", "2 + 3");
        for name in ["A0", "B0", "C0"] {
            assert_eq!(value(&sheet, name), Expression::constant(5));
        }
        assert_eq!(sheet.formula_at(&loc("A0")), Some(&Expression::reference("B0")));
    }

    #[test]
    fn test_reference_to_empty_cell_is_empty() {
        let mut sheet = sheet(5, 3);
        set(&mut sheet, "A0", "B4");
        assert_eq!(value(&sheet, "A0"), Expression::Empty);
    }

    #[test]
    fn test_arithmetic_dependent_recomputes() {
        let mut sheet = sheet(5, 3);
        set(&mut sheet, "A0", "10");
        set(&mut sheet, "A1", "A0 * 2");
        set(&mut sheet, "A2", "A1 + A0");
        assert_eq!(value(&sheet, "A2"), Expression::constant(30));

        set(&mut sheet, "A0", "1");
        assert_eq!(value(&sheet, "A1"), Expression::constant(2));
        assert_eq!(value(&sheet, "A2"), Expression::constant(3));
    }

    #[test]
    fn test_type_error_in_own_formula_rolls_back() {
        let mut sheet = sheet(5, 3);
        set(&mut sheet, "A0", "4");
        let before = snapshot(&sheet);

        let err = sheet.set_cell_from_input(loc("A1"), "B3 + 1").unwrap_err();
        assert!(matches!(err, TabulaError::Type(TypeError::NotANumber { .. })));
        assert_eq!(snapshot(&sheet), before);
    }

    #[test]
    fn test_type_error_in_dependent_rolls_back_everything() {
        let mut sheet = sheet(5, 3);
        set(&mut sheet, "A0", "4");
        set(&mut sheet, "A1", "A0");
        set(&mut sheet, "A2", "A1 + 1");
        set(&mut sheet, "A3", "A0 + 100");
        let before = snapshot(&sheet);

        // A0 becoming empty is fine for A1 but breaks A2 and A3.
        let err = sheet.set_cell_from_input(loc("A0"), "").unwrap_err();
        assert!(matches!(err, TabulaError::Type(_)));
        assert_eq!(snapshot(&sheet), before);
        assert_eq!(sheet.used_by(&loc("A0")), HashSet::from([loc("A1"), loc("A2"), loc("A3")]));
    }

    #[test]
    fn test_division_by_zero_rolls_back() {
        let mut sheet = sheet(5, 3);
        set(&mut sheet, "A0", "5");
        set(&mut sheet, "B0", "100 / A0");
        let before = snapshot(&sheet);

        let err = sheet.set_cell_from_input(loc("A0"), "0").unwrap_err();
        assert!(matches!(err, TabulaError::Type(TypeError::DivisionByZero)));
        assert_eq!(snapshot(&sheet), before);
    }

    #[test]
    fn test_diamond_dependencies_use_final_inputs() {
        let mut sheet = sheet(5, 3);
        set(&mut sheet, "A0", "1");
        set(&mut sheet, "B0", "A0");
        set(&mut sheet, "C0", "A0");
        set(&mut sheet, "A1", "B0 + C0");
        assert_eq!(value(&sheet, "A1"), Expression::constant(2));

        set(&mut sheet, "A0", "20");
        assert_eq!(value(&sheet, "A1"), Expression::constant(40));
    }

    #[test]
    fn test_used_by_is_transitive() {
        let mut sheet = sheet(5, 3);
        sheet.update(CellLocation::new(1, 0), Expression::reference("A3")).unwrap();
        sheet.update(CellLocation::new(2, 0), Expression::reference("A3")).unwrap();
        sheet.update(CellLocation::new(3, 0), Expression::reference("A4")).unwrap();

        assert_eq!(
            sheet.used_by(&CellLocation::new(3, 0)),
            HashSet::from([CellLocation::new(1, 0), CellLocation::new(2, 0)])
        );
        assert_eq!(
            sheet.used_by(&CellLocation::new(4, 0)),
            HashSet::from([
                CellLocation::new(1, 0),
                CellLocation::new(2, 0),
                CellLocation::new(3, 0),
            ])
        );
    }

    #[test]
    fn test_replacing_formula_removes_old_edges() {
        let mut sheet = sheet(5, 3);
        sheet.update(loc("A0"), Expression::constant(1)).unwrap();
        set(&mut sheet, "A1", "A0 + 1");
        assert_eq!(sheet.used_by(&loc("A0")), HashSet::from([loc("A1")]));

        set(&mut sheet, "A1", "B0");
        assert!(sheet.used_by(&loc("A0")).is_empty());
        assert_eq!(sheet.used_by(&loc("B0")), HashSet::from([loc("A1")]));

        // A0 no longer feeds A1, so emptying it cannot fail.
        set(&mut sheet, "A0", "");
        assert_eq!(value(&sheet, "A1"), Expression::Empty);
    }

    #[test]
    fn test_self_reference_is_rejected() {
        let mut sheet = sheet(5, 3);
        let before = snapshot(&sheet);
        let err = sheet.set_cell_from_input(loc("A0"), "A0 + 1").unwrap_err();
        assert!(matches!(
            err,
            TabulaError::CircularReference { cell, via } if cell == loc("A0") && via == loc("A0")
        ));
        assert_eq!(snapshot(&sheet), before);
    }

    #[test]
    fn test_indirect_cycle_is_rejected() {
        let mut sheet = sheet(5, 3);
        set(&mut sheet, "A0", "B0");
        set(&mut sheet, "B0", "C0");
        let before = snapshot(&sheet);

        let err = sheet.set_cell_from_input(loc("C0"), "A0").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Circular reference: C0 would depend on itself through A0"
        );
        assert_eq!(snapshot(&sheet), before);
        assert!(sheet.used_by(&loc("C0")).contains(&loc("A0")));
        assert!(sheet.used_by(&loc("A0")).is_empty());
    }

    #[test]
    fn test_out_of_bounds_update_is_rejected() {
        let mut sheet = sheet(5, 3);
        let err = sheet.update(loc("D0"), Expression::constant(1)).unwrap_err();
        assert!(matches!(err, TabulaError::OutOfBounds(_)));
    }

    #[test]
    fn test_out_of_bounds_reference_dangles() {
        let mut sheet = sheet(5, 3);
        set(&mut sheet, "A0", "Z9");
        assert_eq!(value(&sheet, "A0"), Expression::reference("Z9"));
        assert!(sheet.used_by(&loc("A0")).is_empty());
    }

    #[test]
    fn test_builtins_resolve_without_edges() {
        let mut builder = builder();
        builder.include_builtin("answer", Expression::constant(42));
        let mut sheet = builder.empty(5, 3).unwrap();

        set(&mut sheet, "A0", "answer + 1");
        assert_eq!(value(&sheet, "A0"), Expression::constant(43));
        assert!(sheet.dependents.values().all(|users| users.is_empty()));
    }

    #[test]
    fn test_cell_value_shadows_builtin_of_same_name() {
        let mut builder = builder();
        builder.include_builtin("A0", Expression::constant(99));
        let mut sheet = builder.empty(5, 3).unwrap();

        set(&mut sheet, "A0", "1");
        set(&mut sheet, "B0", "A0");
        assert_eq!(value(&sheet, "B0"), Expression::constant(1));
    }

    #[test]
    fn test_resize_links_dangling_references() {
        let mut sheet = sheet(2, 2);
        set(&mut sheet, "A0", "C3");
        assert_eq!(value(&sheet, "A0"), Expression::reference("C3"));

        sheet.resize(4, 3).unwrap();
        assert_eq!(value(&sheet, "A0"), Expression::Empty);
        assert_eq!(sheet.used_by(&loc("C3")), HashSet::from([loc("A0")]));

        set(&mut sheet, "C3", "8");
        assert_eq!(value(&sheet, "A0"), Expression::constant(8));
    }

    #[test]
    fn test_leading_zero_reference_links_to_cell() {
        let mut sheet = sheet(3, 3);
        set(&mut sheet, "A1", "4");
        set(&mut sheet, "B0", "A01 * 2");
        assert_eq!(value(&sheet, "B0"), Expression::constant(8));
        assert_eq!(sheet.used_by(&loc("A1")), HashSet::from([loc("B0")]));

        set(&mut sheet, "A1", "5");
        assert_eq!(value(&sheet, "B0"), Expression::constant(10));
    }

    #[test]
    fn test_leading_zero_self_reference_is_cycle() {
        let mut sheet = sheet(3, 3);
        let err = sheet.set_cell_from_input(loc("A0"), "A00 + 1").unwrap_err();
        assert!(matches!(err, TabulaError::CircularReference { .. }), "{:?}", err);
    }

    #[test]
    fn test_clear_resets_cells_and_dependencies() {
        let mut sheet = sheet(3, 3);
        set(&mut sheet, "A0", "2");
        set(&mut sheet, "A1", "A0 * A0");
        sheet.clear();

        let (formulas, values) = snapshot(&sheet);
        assert!(formulas.iter().all(|f| *f == Expression::Empty));
        assert!(values.iter().all(|v| *v == Expression::Empty));
        assert!(sheet.used_by(&loc("A0")).is_empty());
    }

    #[test]
    fn test_set_cell_from_input_reports_parse_error() {
        let mut sheet = sheet(3, 3);
        let err = sheet.set_cell_from_input(loc("A0"), "1 % 2").unwrap_err();
        assert_eq!(err.to_string(), "Unable to parse: 1 % 2");
    }

    #[test]
    fn test_encode_renders_formulas() {
        let mut sheet = sheet(2, 3);
        set(&mut sheet, "A0", "1");
        set(&mut sheet, "C0", "A0 + 2");
        set(&mut sheet, "B1", "A0");
        assert_eq!(sheet.encode(), "2|3\n1||A0 + 2\n|A0|");
        assert_eq!(
            sheet.formula_at(&loc("C0")),
            Some(&Expression::operator(
                Operator::Plus,
                vec![Expression::reference("A0"), Expression::constant(2)]
            ))
        );
    }
}
