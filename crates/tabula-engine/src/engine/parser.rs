//! Text to expression parsing.
//!
//! The simple grammar has no precedence climbing or parentheses: the input
//! is split on the first operator symbol present, checked in the fixed order
//! `=`, `<`, `+`, `-`, `*`, `/`, and every piece is parsed recursively.
//! Anything that is neither a number nor an operator application must be an
//! alphanumeric identifier.

use super::{CoreFactory, Expression, ExpressionFactory, ParseError};

/// Split order; earlier symbols bind loosest.
const SPLIT_ORDER: [char; 6] = ['=', '<', '+', '-', '*', '/'];

/// Turns formula text into an expression.
pub trait Parser: Send + Sync {
    /// Whitespace-only input must parse to [`Expression::Empty`].
    fn parse(&self, input: &str) -> Result<Expression, ParseError>;
}

#[derive(Clone, Debug, Default)]
pub struct SimpleParser<F = CoreFactory> {
    factory: F,
}

impl SimpleParser<CoreFactory> {
    pub fn new() -> Self {
        SimpleParser {
            factory: CoreFactory,
        }
    }
}

impl<F: ExpressionFactory> SimpleParser<F> {
    fn parse_piece(&self, input: &str) -> Result<Expression, ParseError> {
        let input = input.trim();

        if let Ok(number) = input.parse::<i64>() {
            return Ok(self.factory.create_constant(number));
        }

        if let Some(symbol) = SPLIT_ORDER.into_iter().find(|c| input.contains(*c)) {
            let mut pieces: Vec<&str> = input.split(symbol).collect();
            while pieces.last().is_some_and(|piece| piece.is_empty()) {
                pieces.pop();
            }
            let operands = pieces
                .into_iter()
                .map(|piece| self.parse_piece(piece))
                .collect::<Result<Vec<_>, _>>()?;
            return self
                .factory
                .create_operator(&symbol.to_string(), operands)
                .map_err(|e| ParseError::new(input, e.to_string()));
        }

        if let Some(bad) = input.chars().find(|c| !c.is_alphanumeric()) {
            return Err(ParseError::new(input, format!("Unexpected character '{}'", bad)));
        }

        if input.is_empty() {
            return Ok(self.factory.create_empty());
        }
        Ok(self.factory.create_reference(input))
    }
}

impl<F: ExpressionFactory + Send + Sync> Parser for SimpleParser<F> {
    fn parse(&self, input: &str) -> Result<Expression, ParseError> {
        self.parse_piece(input).map_err(|e| ParseError {
            input: input.to_string(),
            reason: e.reason,
        })
    }
}
