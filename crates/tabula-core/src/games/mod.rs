//! Games played on a sheet through its read/write capabilities.

mod life;

pub use life::Life;
