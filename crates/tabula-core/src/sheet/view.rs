//! Read and write capabilities handed to front-ends and games.
//!
//! Collaborators never see expressions: they read rendered strings with
//! display hints and write formula text, receiving a success/failure
//! response instead of an error.

use super::Sheet;
use crate::error::TabulaError;
use tabula_engine::engine::CellLocation;

const BACKGROUND: &str = "white";
const FOREGROUND: &str = "black";

/// Rendered cell content with display hints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewElement {
    pub content: String,
    pub background: String,
    pub foreground: String,
}

impl ViewElement {
    pub fn new(content: &str, background: &str, foreground: &str) -> ViewElement {
        ViewElement {
            content: content.to_string(),
            background: background.to_string(),
            foreground: foreground.to_string(),
        }
    }

    fn plain(content: &str) -> ViewElement {
        ViewElement::new(content, BACKGROUND, FOREGROUND)
    }
}

/// Outcome of a write through [`SheetUpdate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UpdateResponse {
    Success,
    Failure(String),
}

impl UpdateResponse {
    pub fn success() -> UpdateResponse {
        UpdateResponse::Success
    }

    pub fn fail(message: impl Into<String>) -> UpdateResponse {
        UpdateResponse::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UpdateResponse::Success)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            UpdateResponse::Success => None,
            UpdateResponse::Failure(message) => Some(message),
        }
    }
}

/// Read access to a grid of rendered cells.
pub trait SheetView {
    fn rows(&self) -> usize;
    fn columns(&self) -> usize;
    fn value_at(&self, row: usize, column: usize) -> ViewElement;
    fn formula_at(&self, row: usize, column: usize) -> ViewElement;
}

/// Write access to a grid through formula text.
pub trait SheetUpdate {
    fn update(&mut self, row: usize, column: usize, input: &str) -> UpdateResponse;
}

impl SheetView for Sheet {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn value_at(&self, row: usize, column: usize) -> ViewElement {
        let content = Sheet::value_at(self, &CellLocation::new(row, column))
            .map(|value| value.render())
            .unwrap_or_default();
        ViewElement::plain(&content)
    }

    fn formula_at(&self, row: usize, column: usize) -> ViewElement {
        let content = Sheet::formula_at(self, &CellLocation::new(row, column))
            .map(|formula| formula.render())
            .unwrap_or_default();
        ViewElement::plain(&content)
    }
}

impl SheetUpdate for Sheet {
    fn update(&mut self, row: usize, column: usize, input: &str) -> UpdateResponse {
        match self.set_cell_from_input(CellLocation::new(row, column), input) {
            Ok(()) => UpdateResponse::success(),
            Err(TabulaError::Syntax(_)) => UpdateResponse::fail(format!("Unable to parse: {}", input)),
            Err(e) => UpdateResponse::fail(e.to_string()),
        }
    }
}
