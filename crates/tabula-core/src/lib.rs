//! tabula-core - UI-agnostic sheet model, dependency engine and storage.

pub mod error;
pub mod games;
pub mod sheet;
pub mod storage;

pub use error::{Result, TabulaError};
pub use sheet::{Sheet, SheetBuilder, SheetUpdate, SheetView, UpdateResponse, ViewElement};

pub use tabula_engine::engine::{CellLocation, Expression};
