//! Tabula - a small terminal spreadsheet

mod config;
mod text_ui;

use anyhow::{Context, Result};
use config::Config;
use std::env;
use std::io;
use std::path::PathBuf;
use tabula_core::storage::read_sheet;
use tabula_core::{CellLocation, Sheet};
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: tabula [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Sheet file to open");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula in an empty sheet and print it");
    eprintln!("  -p, --print               Print the sheet's values and exit");
    eprintln!("  --config <FILE>           Read configuration from FILE");
    eprintln!("  --no-config               Ignore the user configuration file");
    eprintln!("  -h, --help                Print help");
}

#[derive(Default)]
struct Options {
    file_path: Option<PathBuf>,
    command: Option<String>,
    print: bool,
    config_path: Option<PathBuf>,
    no_config: bool,
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires a formula");
                    std::process::exit(1);
                }
                options.command = Some(args[i].to_string());
            }
            "-p" | "--print" => {
                options.print = true;
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                options.config_path = Some(PathBuf::from(&args[i]));
            }
            "--no-config" => {
                options.no_config = true;
            }
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if options.file_path.is_none() {
                    options.file_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    init_logging();

    if let Err(e) = run(options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(options: &Options) -> Result<Config> {
    if options.no_config {
        return Ok(Config::default());
    }
    match &options.config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load_default().context("Failed to load user config"),
    }
}

fn run(options: Options) -> Result<()> {
    let config = load_config(&options)?;
    let builder = config.builder();
    let mut sheet = builder
        .empty(config.rows, config.columns)
        .context("Invalid sheet size in config")?;

    if let Some(formula) = &options.command {
        return run_command(sheet, formula);
    }

    if let Some(path) = &options.file_path {
        if path.exists() {
            read_sheet(path, &mut sheet)
                .with_context(|| format!("Failed to load {}", path.display()))?;
        } else if options.print {
            anyhow::bail!("No such file: {}", path.display());
        }
    }

    if options.print {
        print!("{}", text_ui::render_sheet(&sheet));
        return Ok(());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    text_ui::TextUi::new(sheet, options.file_path, stdin.lock(), stdout.lock()).run()
}

/// Evaluate a single formula in the first cell of a fresh sheet and print
/// its value.
fn run_command(mut sheet: Sheet, formula: &str) -> Result<()> {
    let location = CellLocation::new(0, 0);
    sheet.set_cell_from_input(location, formula)?;
    let value = sheet
        .value_at(&location)
        .map(|value| value.render())
        .unwrap_or_default();
    println!("{}", value);
    Ok(())
}
