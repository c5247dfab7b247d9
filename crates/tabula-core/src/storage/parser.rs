//! Reader for the sheet file format

use crate::error::{Result, TabulaError};
use crate::sheet::Sheet;
use std::fs;
use std::path::Path;
use tabula_engine::engine::CellLocation;

/// Load a sheet file into `sheet`, replacing its contents.
///
/// Returns the number of non-empty cells applied.
pub fn read_sheet(path: &Path, sheet: &mut Sheet) -> Result<usize> {
    let content = fs::read_to_string(path)?;
    let applied = load_into(sheet, &content)?;
    tracing::debug!(path = %path.display(), cells = applied, "loaded sheet");
    Ok(applied)
}

/// Parse the `rows|columns` header.
pub fn decode_dimensions(content: &str) -> Result<(usize, usize)> {
    let header = content.lines().next().unwrap_or_default().trim();
    let bad_header = || TabulaError::Parse {
        line: 1,
        message: format!("Expected 'ROWS|COLUMNS' header, found '{}'", header),
    };

    let (rows, columns) = header.split_once('|').ok_or_else(bad_header)?;
    let rows = rows.trim().parse::<usize>().map_err(|_| bad_header())?;
    let columns = columns.trim().parse::<usize>().map_err(|_| bad_header())?;
    Ok((rows, columns))
}

/// Parse every non-empty cell as `(location, formula text)` in row-major order.
pub fn decode_cells(content: &str) -> Result<Vec<(CellLocation, String)>> {
    let (rows, columns) = decode_dimensions(content)?;
    let mut cells = Vec::new();

    for (row, line) in content.lines().skip(1).enumerate() {
        let line_num = row + 2;
        let fields: Vec<&str> = line.split('|').collect();

        if row >= rows {
            if line.trim().is_empty() {
                continue;
            }
            return Err(TabulaError::Parse {
                line: line_num,
                message: format!("More rows than the {} declared", rows),
            });
        }
        if fields.len() > columns {
            return Err(TabulaError::Parse {
                line: line_num,
                message: format!(
                    "Row has {} cells but only {} columns are declared",
                    fields.len(),
                    columns
                ),
            });
        }

        for (column, field) in fields.into_iter().enumerate() {
            let field = field.trim();
            if !field.is_empty() {
                cells.push((CellLocation::new(row, column), field.to_string()));
            }
        }
    }

    Ok(cells)
}

/// Replace the contents of `sheet` with the decoded file content.
///
/// The sheet is cleared and grown to at least the stored dimensions before
/// any cell is written. Cells may reference cells stored after them, so
/// failed cells are retried until a pass makes no progress. Nothing changes
/// unless every cell applies.
pub fn load_into(sheet: &mut Sheet, content: &str) -> Result<usize> {
    let (rows, columns) = decode_dimensions(content)?;
    let mut pending = decode_cells(content)?;
    let total = pending.len();

    let mut staged = sheet.clone();
    staged.clear();
    staged.resize(rows.max(staged.rows()), columns.max(staged.columns()))?;

    while !pending.is_empty() {
        let before = pending.len();
        let mut failed = Vec::new();
        let mut first_error = None;

        for (location, input) in pending {
            if let Err(e) = staged.set_cell_from_input(location, &input) {
                if first_error.is_none() {
                    first_error = Some(TabulaError::Update {
                        cell: location,
                        message: e.to_string(),
                    });
                }
                failed.push((location, input));
            }
        }

        if failed.len() == before {
            if let Some(error) = first_error {
                return Err(error);
            }
        }
        if !failed.is_empty() {
            tracing::trace!(remaining = failed.len(), "retrying cells");
        }
        pending = failed;
    }

    *sheet = staged;
    Ok(total)
}
