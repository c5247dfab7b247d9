//! Formula and value nodes.
//!
//! An [`Expression`] is both what a user types into a cell (its formula) and
//! what the cell evaluates to (its value). Expressions are immutable: every
//! evaluation builds a new node, so one instance can be cloned freely into
//! many cells.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use super::{Operator, TypeError};

/// Identifier to expression bindings used while evaluating.
///
/// Built-in names and canonical cell location strings share the key space.
pub type SymbolTable = HashMap<String, Expression>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expression {
    Constant(i64),
    Reference(String),
    Empty,
    Operator(Operator, Vec<Expression>),
}

impl Expression {
    pub fn constant(value: i64) -> Expression {
        Expression::Constant(value)
    }

    pub fn reference(identifier: impl Into<String>) -> Expression {
        Expression::Reference(identifier.into())
    }

    pub fn operator(op: Operator, operands: Vec<Expression>) -> Expression {
        Expression::Operator(op, operands)
    }

    /// All identifiers this expression (transitively) refers to.
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut deps = BTreeSet::new();
        self.collect_dependencies(&mut deps);
        deps
    }

    fn collect_dependencies(&self, deps: &mut BTreeSet<String>) {
        match self {
            Expression::Constant(_) | Expression::Empty => {}
            Expression::Reference(identifier) => {
                deps.insert(identifier.clone());
            }
            Expression::Operator(_, operands) => {
                for operand in operands {
                    operand.collect_dependencies(deps);
                }
            }
        }
    }

    /// The number this node holds. Only constants are number-bearing.
    pub fn numeric_value(&self) -> Result<i64, TypeError> {
        match self {
            Expression::Constant(value) => Ok(*value),
            other => Err(TypeError::NotANumber {
                found: other.describe(),
            }),
        }
    }

    /// Reduce the expression against a symbol table.
    ///
    /// References found in the table are replaced by the evaluation of their
    /// binding; unknown references evaluate to themselves. Operators reduce
    /// to a constant or fail when an operand is not a number.
    pub fn evaluate(&self, symbols: &SymbolTable) -> Result<Expression, TypeError> {
        let mut lookups = Vec::new();
        self.evaluate_in(symbols, &mut lookups)
    }

    fn evaluate_in<'a>(
        &'a self,
        symbols: &'a SymbolTable,
        lookups: &mut Vec<&'a str>,
    ) -> Result<Expression, TypeError> {
        match self {
            Expression::Constant(_) | Expression::Empty => Ok(self.clone()),
            Expression::Reference(identifier) => {
                let Some(binding) = symbols.get(identifier) else {
                    return Ok(self.clone());
                };
                // A binding chain that comes back to itself would never bottom out.
                if lookups.contains(&identifier.as_str()) {
                    return Err(TypeError::CircularReference(identifier.clone()));
                }
                lookups.push(identifier.as_str());
                let result = binding.evaluate_in(symbols, lookups);
                lookups.pop();
                result
            }
            Expression::Operator(op, operands) => {
                let values = operands
                    .iter()
                    .map(|operand| operand.evaluate_in(symbols, lookups)?.numeric_value())
                    .collect::<Result<Vec<i64>, TypeError>>()?;
                Ok(Expression::Constant(op.apply(&values)?))
            }
        }
    }

    /// Canonical text form, re-parseable by the simple parser.
    pub fn render(&self) -> String {
        match self {
            Expression::Constant(value) => value.to_string(),
            Expression::Reference(identifier) => identifier.clone(),
            Expression::Empty => String::new(),
            Expression::Operator(op, operands) => operands
                .iter()
                .map(Expression::render)
                .collect::<Vec<_>>()
                .join(&format!(" {} ", op.symbol())),
        }
    }

    fn describe(&self) -> String {
        match self {
            Expression::Constant(value) => value.to_string(),
            Expression::Reference(identifier) => format!("unresolved reference {}", identifier),
            Expression::Empty => "empty".to_string(),
            Expression::Operator(..) => format!("unevaluated formula `{}`", self.render()),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
