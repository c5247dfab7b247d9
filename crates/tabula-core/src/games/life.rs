//! Conway's Game of Life.
//!
//! A cell is live when its value renders as `1`. Births write `1`, deaths
//! write an empty formula. The board does not wrap at the edges.

use crate::error::{Result, TabulaError};
use crate::sheet::{SheetUpdate, SheetView};
use std::collections::HashSet;
use tabula_engine::engine::CellLocation;

const LIVE: &str = "1";
const DEAD: &str = "";

pub struct Life;

impl Life {
    /// Advance the board one generation and return the number of live cells.
    pub fn step<S>(sheet: &mut S) -> Result<usize>
    where
        S: SheetView + SheetUpdate,
    {
        let (rows, columns) = (sheet.rows(), sheet.columns());
        let live = Self::live_cells(sheet);

        let mut next = HashSet::new();
        for row in 0..rows {
            for column in 0..columns {
                let alive = live.contains(&(row, column));
                let count = Self::neighbours(row, column, rows, columns)
                    .filter(|cell| live.contains(cell))
                    .count();
                if count == 3 || (alive && count == 2) {
                    next.insert((row, column));
                }
            }
        }

        for &(row, column) in live.difference(&next) {
            Self::write(sheet, row, column, DEAD)?;
        }
        for &(row, column) in next.difference(&live) {
            Self::write(sheet, row, column, LIVE)?;
        }

        tracing::trace!(live = next.len(), "life generation");
        Ok(next.len())
    }

    fn live_cells<S: SheetView>(sheet: &S) -> HashSet<(usize, usize)> {
        let mut live = HashSet::new();
        for row in 0..sheet.rows() {
            for column in 0..sheet.columns() {
                if sheet.value_at(row, column).content == LIVE {
                    live.insert((row, column));
                }
            }
        }
        live
    }

    fn neighbours(
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    ) -> impl Iterator<Item = (usize, usize)> {
        let row_range = row.saturating_sub(1)..=(row + 1).min(rows - 1);
        row_range.flat_map(move |r| {
            let column_range = column.saturating_sub(1)..=(column + 1).min(columns - 1);
            column_range
                .map(move |c| (r, c))
                .filter(move |&cell| cell != (row, column))
        })
    }

    fn write<S: SheetUpdate>(sheet: &mut S, row: usize, column: usize, input: &str) -> Result<()> {
        let response = sheet.update(row, column, input);
        match response.message() {
            None => Ok(()),
            Some(message) => Err(TabulaError::Update {
                cell: CellLocation::new(row, column),
                message: message.to_string(),
            }),
        }
    }
}
