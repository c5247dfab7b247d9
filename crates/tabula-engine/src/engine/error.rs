//! Error kinds raised while building, parsing and evaluating expressions.

use thiserror::Error;

/// An expression did not reduce to a number where one was required.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("expected a number, found {found}")]
    NotANumber { found: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("reference {0} resolves to itself")]
    CircularReference(String),
}

/// Malformed operator construction, caught before a formula reaches a sheet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidExpression {
    #[error("No arguments provided")]
    NoArguments,

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
}

/// Formula text could not be turned into an expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unable to parse: {input}")]
pub struct ParseError {
    pub input: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(input: &str, reason: impl Into<String>) -> ParseError {
        ParseError {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
