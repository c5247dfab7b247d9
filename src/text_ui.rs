//! Line-oriented front-end.
//!
//! Prints the grid of values, then reads one command per line until `quit`
//! or end of input. A failed command prints `Error: <message>` and the loop
//! carries on.

use anyhow::{Context, Result, anyhow, bail};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tabula_core::games::Life;
use tabula_core::storage::{read_sheet, write_sheet};
use tabula_core::{CellLocation, Sheet, SheetView};

const HELP: &str = "\
Commands:
  set <REF> <formula>    Write a formula into a cell (e.g. set B2 A0 + 1)
  show <REF>             Show the formula and value of a cell
  deps <REF>             List the cells that use a cell
  clear                  Empty every cell
  resize <ROWS> <COLS>   Grow the sheet
  life [N]               Run N generations of Life (default 1)
  save [PATH]            Save to PATH or the current file
  load <PATH>            Replace the sheet with a saved file
  help                   Show this help
  quit                   Leave";

enum Flow {
    Continue,
    Quit,
}

pub struct TextUi<R, W> {
    sheet: Sheet,
    file_path: Option<PathBuf>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TextUi<R, W> {
    pub fn new(sheet: Sheet, file_path: Option<PathBuf>, input: R, output: W) -> Self {
        TextUi {
            sheet,
            file_path,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        self.print_sheet()?;
        let mut line = String::new();
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                break;
            }
            match self.execute(line.trim()) {
                Ok(Flow::Quit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => writeln!(self.output, "Error: {:#}", e)?,
            }
        }
        Ok(())
    }

    fn execute(&mut self, line: &str) -> Result<Flow> {
        let (command, args) = match line.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}
            "quit" | "q" | "exit" => return Ok(Flow::Quit),
            "help" | "h" => writeln!(self.output, "{}", HELP)?,
            "set" => {
                let (cell, formula) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
                let location = parse_location(cell)?;
                self.sheet.set_cell_from_input(location, formula)?;
                self.print_sheet()?;
            }
            "show" => {
                let location = parse_location(args)?;
                let formula = self
                    .sheet
                    .formula_at(&location)
                    .ok_or_else(|| anyhow!("Cell {} is outside the sheet", location))?;
                let value = self.sheet.value_at(&location).map(|v| v.render()).unwrap_or_default();
                writeln!(self.output, "{}: {} = {}", location, formula, value)?;
            }
            "deps" => {
                let location = parse_location(args)?;
                let mut users: Vec<CellLocation> = self.sheet.used_by(&location).into_iter().collect();
                users.sort_by_key(|cell| (cell.row, cell.column));
                if users.is_empty() {
                    writeln!(self.output, "{} is not used by any cell", location)?;
                } else {
                    let names: Vec<String> = users.iter().map(ToString::to_string).collect();
                    writeln!(self.output, "{} is used by {}", location, names.join(", "))?;
                }
            }
            "clear" => {
                self.sheet.clear();
                self.print_sheet()?;
            }
            "resize" => {
                let dims: Vec<&str> = args.split_whitespace().collect();
                let [rows, columns] = dims.as_slice() else {
                    bail!("Usage: resize <ROWS> <COLS>");
                };
                let rows = rows
                    .parse::<usize>()
                    .with_context(|| format!("Invalid row count: {}", rows))?;
                let columns = columns
                    .parse::<usize>()
                    .with_context(|| format!("Invalid column count: {}", columns))?;
                self.sheet.resize(rows, columns)?;
                self.print_sheet()?;
            }
            "life" => {
                let generations = if args.is_empty() {
                    1
                } else {
                    args.parse::<usize>()
                        .with_context(|| format!("Invalid generation count: {}", args))?
                };
                let mut live = 0;
                for _ in 0..generations {
                    live = Life::step(&mut self.sheet)?;
                }
                self.print_sheet()?;
                writeln!(self.output, "{} generation(s), {} live", generations, live)?;
            }
            "save" | "w" => {
                if !args.is_empty() {
                    self.file_path = Some(PathBuf::from(args));
                }
                let Some(path) = &self.file_path else {
                    bail!("No file path. Use save <PATH>");
                };
                write_sheet(path, &self.sheet)?;
                writeln!(self.output, "Saved to {}", path.display())?;
            }
            "load" | "e" => {
                if args.is_empty() {
                    bail!("Usage: load <PATH>");
                }
                let path = PathBuf::from(args);
                read_sheet(&path, &mut self.sheet)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                self.file_path = Some(path);
                self.print_sheet()?;
            }
            _ => bail!("Unknown command: {}", command),
        }
        Ok(Flow::Continue)
    }

    fn print_sheet(&mut self) -> Result<()> {
        write!(self.output, "{}", render_sheet(&self.sheet))?;
        Ok(())
    }
}

fn parse_location(text: &str) -> Result<CellLocation> {
    if text.is_empty() {
        bail!("Missing cell reference");
    }
    CellLocation::parse(text).ok_or_else(|| anyhow!("Invalid cell reference: {}", text))
}

/// Render every cell value as a text table with column letters and row
/// numbers.
pub fn render_sheet<S: SheetView>(sheet: &S) -> String {
    let (rows, columns) = (sheet.rows(), sheet.columns());
    let cells: Vec<Vec<String>> = (0..rows)
        .map(|row| {
            (0..columns)
                .map(|column| sheet.value_at(row, column).content)
                .collect()
        })
        .collect();
    let letters: Vec<String> = (0..columns)
        .map(|column| {
            CellLocation::new(0, column)
                .column_letter()
                .map(String::from)
                .unwrap_or_default()
        })
        .collect();

    let label_width = rows.saturating_sub(1).to_string().len();
    let widths: Vec<usize> = (0..columns)
        .map(|column| {
            cells
                .iter()
                .map(|row| row[column].len())
                .max()
                .unwrap_or(0)
                .max(letters[column].len())
        })
        .collect();

    let mut out = String::new();
    let mut push_line = |label: &str, fields: &[String]| {
        let mut line = format!("{:>width$}", label, width = label_width);
        for (field, width) in fields.iter().zip(&widths) {
            line.push_str(&format!(" | {:>width$}", field, width = *width));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_line("", &letters);
    for (row, fields) in cells.iter().enumerate() {
        push_line(&row.to_string(), fields);
    }
    out
}
