use super::Sheet;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tabula_engine::engine::{Expression, Parser};

/// Collects built-ins and produces independent sheets.
///
/// Each built sheet gets its own copy of the built-ins as they were at build
/// time; later calls to [`SheetBuilder::include_builtin`] never reach sheets
/// that already exist.
pub struct SheetBuilder {
    builtins: HashMap<String, Expression>,
    parser: Arc<dyn Parser>,
    default_expression: Expression,
}

impl SheetBuilder {
    pub fn new(parser: Arc<dyn Parser>, default_expression: Expression) -> Self {
        SheetBuilder {
            builtins: HashMap::new(),
            parser,
            default_expression,
        }
    }

    /// Make `expression` available to every formula under `identifier`.
    pub fn include_builtin(
        &mut self,
        identifier: impl Into<String>,
        expression: Expression,
    ) -> &mut Self {
        self.builtins.insert(identifier.into(), expression);
        self
    }

    /// Build a sheet of the given size filled with the default expression.
    pub fn empty(&self, rows: usize, columns: usize) -> Result<Sheet> {
        Sheet::new(
            self.parser.clone(),
            Arc::new(self.builtins.clone()),
            self.default_expression.clone(),
            rows,
            columns,
        )
    }
}
