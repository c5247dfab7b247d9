//! Validated construction of expressions.

use super::{Expression, InvalidExpression, Operator};

/// Builds expression nodes for a parser.
pub trait ExpressionFactory {
    fn create_reference(&self, identifier: &str) -> Expression;
    fn create_constant(&self, value: i64) -> Expression;
    fn create_empty(&self) -> Expression;
    /// Build an operator node from its symbol.
    fn create_operator(
        &self,
        name: &str,
        operands: Vec<Expression>,
    ) -> Result<Expression, InvalidExpression>;
}

/// Factory for the core expression set.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoreFactory;

impl ExpressionFactory for CoreFactory {
    fn create_reference(&self, identifier: &str) -> Expression {
        Expression::reference(identifier)
    }

    fn create_constant(&self, value: i64) -> Expression {
        Expression::constant(value)
    }

    fn create_empty(&self) -> Expression {
        Expression::Empty
    }

    fn create_operator(
        &self,
        name: &str,
        operands: Vec<Expression>,
    ) -> Result<Expression, InvalidExpression> {
        if operands.is_empty() {
            return Err(InvalidExpression::NoArguments);
        }
        let op = Operator::from_symbol(name)
            .ok_or_else(|| InvalidExpression::UnknownOperator(name.to_string()))?;
        Ok(Expression::operator(op, operands))
    }
}
