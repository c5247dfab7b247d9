//! Writer for the sheet file format

use crate::error::Result;
use crate::sheet::Sheet;
use std::fs;
use std::path::Path;

/// Write a sheet's formulas to a file
pub fn write_sheet(path: &Path, sheet: &Sheet) -> Result<()> {
    let content = encode_sheet(sheet);
    fs::write(path, content)?;
    tracing::debug!(path = %path.display(), "saved sheet");
    Ok(())
}

/// Encode a sheet's formulas as file content (newline terminated)
pub fn encode_sheet(sheet: &Sheet) -> String {
    sheet.encode() + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::SheetBuilder;
    use std::sync::Arc;
    use tabula_engine::engine::{CellLocation, Expression, SimpleParser};

    fn sheet(rows: usize, columns: usize) -> Sheet {
        SheetBuilder::new(Arc::new(SimpleParser::new()), Expression::Empty)
            .empty(rows, columns)
            .unwrap()
    }

    #[test]
    fn test_header_has_dimensions() {
        let content = encode_sheet(&sheet(3, 2));
        assert_eq!(content.lines().next(), Some("3|2"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_writes_formulas_not_values() {
        let mut sheet = sheet(2, 2);
        sheet
            .set_cell_from_input(CellLocation::new(0, 0), "4")
            .unwrap();
        sheet
            .set_cell_from_input(CellLocation::new(1, 1), "A0 * A0")
            .unwrap();
        let content = encode_sheet(&sheet);
        assert_eq!(content, "2|2\n4|\n|A0 * A0\n");
    }

    #[test]
    fn test_write_sheet_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.sheet");
        let mut sheet = sheet(1, 3);
        sheet
            .set_cell_from_input(CellLocation::new(0, 2), "7")
            .unwrap();
        write_sheet(&path, &sheet).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "1|3\n||7\n");
    }
}
