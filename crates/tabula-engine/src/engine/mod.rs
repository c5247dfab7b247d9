//! Formula engine API.
//!
//! This module provides the building blocks the sheet evaluates:
//!
//! - [`Expression`], [`SymbolTable`] - Immutable formula/value nodes
//! - [`Operator`] - The fixed set of n-ary arithmetic and comparison operators
//! - [`CellLocation`] - Cell coordinates (letter + zero-indexed row ↔ row/column)
//! - [`ExpressionFactory`], [`CoreFactory`] - Validated expression construction
//! - [`Parser`], [`SimpleParser`] - Text to expression parsing
//! - [`TypeError`], [`ParseError`], [`InvalidExpression`] - Error kinds

mod cell_location;
mod error;
mod expr;
mod factory;
mod operator;
mod parser;

pub use cell_location::{CellLocation, MAX_COLUMNS};
pub use error::{InvalidExpression, ParseError, TypeError};
pub use expr::{Expression, SymbolTable};
pub use factory::{CoreFactory, ExpressionFactory};
pub use operator::Operator;
pub use parser::{Parser, SimpleParser};
