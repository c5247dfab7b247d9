//! Cell location parsing and formatting.
//!
//! Provides bidirectional conversion between the sheet's cell references
//! (a single column letter followed by a zero-indexed row, e.g. "A0", "C12")
//! and row/column coordinates.
//!
//! # Examples
//!
//! ```
//! use tabula_engine::engine::CellLocation;
//!
//! let cell = CellLocation::parse("B3").unwrap();
//! assert_eq!(cell.row, 3);
//! assert_eq!(cell.column, 1);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Number of addressable columns (one letter each, A through Z).
pub const MAX_COLUMNS: usize = 26;

/// A cell by row and column indices (both 0-indexed).
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct CellLocation {
    pub row: usize,
    pub column: usize,
}

impl CellLocation {
    pub fn new(row: usize, column: usize) -> CellLocation {
        CellLocation { row, column }
    }

    /// Build a location from a column letter ('A'..='Z').
    pub fn from_letter(row: usize, column: char) -> Option<CellLocation> {
        if !column.is_ascii_uppercase() {
            return None;
        }
        Some(CellLocation::new(row, (column as u8 - b'A') as usize))
    }

    /// Parse a location: one uppercase letter then one or more digits.
    ///
    /// Leading zeros in the row are accepted (`A01` is row 1); parse is the
    /// inverse of `Display`.
    pub fn parse(name: &str) -> Option<CellLocation> {
        let caps = location_re().captures(name)?;
        let column = caps["column"].as_bytes()[0];
        let row = caps["row"].parse::<usize>().ok()?;
        Some(CellLocation::new(row, (column - b'A') as usize))
    }

    /// Column letter for this location, `None` past 'Z'.
    pub fn column_letter(&self) -> Option<char> {
        if self.column < MAX_COLUMNS {
            Some((b'A' + self.column as u8) as char)
        } else {
            None
        }
    }
}

fn location_re() -> &'static Regex {
    static LOCATION_RE: OnceLock<Regex> = OnceLock::new();
    LOCATION_RE.get_or_init(|| {
        Regex::new(r"^(?<column>[A-Z])(?<row>[0-9]+)$")
            .expect("cell location regex must compile")
    })
}

impl std::str::FromStr for CellLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell reference: {}", s))
    }
}

impl fmt::Display for CellLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column_letter() {
            Some(letter) => write!(f, "{}{}", letter, self.row),
            None => write!(f, "#{}:{}", self.column, self.row),
        }
    }
}
