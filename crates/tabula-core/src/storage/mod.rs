//! Storage for the pipe-separated sheet format.
//!
//! The first line holds `rows|columns`; every following line holds one row
//! of rendered formulas joined by `|`, with empty cells as empty fields.

mod parser;
mod writer;

pub use parser::{decode_cells, decode_dimensions, load_into, read_sheet};
pub use writer::{encode_sheet, write_sheet};
