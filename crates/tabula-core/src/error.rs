//! Error types for Tabula core.

use tabula_engine::engine::{CellLocation, ParseError, TypeError};
use thiserror::Error;

/// Errors that can occur while editing, loading or saving a sheet
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Syntax(#[from] ParseError),

    #[error("Type error: {0}")]
    Type(#[from] TypeError),

    #[error("Circular reference: {cell} would depend on itself through {via}")]
    CircularReference { cell: CellLocation, via: CellLocation },

    #[error("Cell {0} is outside the sheet")]
    OutOfBounds(CellLocation),

    #[error("Invalid dimensions {rows}x{columns}")]
    InvalidDimensions { rows: usize, columns: usize },

    #[error("Unable to update {cell}: {message}")]
    Update { cell: CellLocation, message: String },
}

pub type Result<T> = std::result::Result<T, TabulaError>;
