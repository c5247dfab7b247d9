//! Sheet state, transactional evaluation and the read/write capabilities.

mod builder;
mod eval;
mod state;
mod view;

pub use builder::SheetBuilder;
pub use state::Sheet;
pub use view::{SheetUpdate, SheetView, UpdateResponse, ViewElement};
