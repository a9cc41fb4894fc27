//! tabula CLI - inspect and convert spreadsheet documents

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tabula::prelude::*;
use tabula::RangeRequest;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tabula")]
#[command(author, version, about = "Inspect and convert spreadsheet documents")]
struct Cli {
    /// Log engine activity to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Target {
    /// Input document (csv, tsv, txt, json)
    input: PathBuf,

    /// Sheet name (default: first sheet)
    #[arg(short, long)]
    sheet: Option<String>,

    /// First row is a header; row 0 is the row below it
    #[arg(long)]
    header: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets in a document
    Sheets {
        /// Input document
        input: PathBuf,
    },

    /// Print a whole sheet or a range as delimited text
    Dump {
        #[command(flatten)]
        target: Target,

        /// ROW_BEGIN,ROW_END,COL_BEGIN,COL_END (rows and first column
        /// zero-based, end column one-based)
        #[arg(short, long, value_parser = parse_range)]
        range: Option<RangeRequest>,

        /// Field delimiter (default: tab)
        #[arg(short, long, default_value = "\t")]
        delimiter: char,
    },

    /// Print one cell's value and formatting
    Cell {
        #[command(flatten)]
        target: Target,

        /// Zero-based row
        row: u32,

        /// Zero-based column
        column: u32,
    },

    /// Save a document in the format named by the output extension
    #[command(alias = "save-as")]
    Convert {
        /// Input document
        input: PathBuf,

        /// Output file (csv, tsv, txt, json)
        output: PathBuf,

        /// Sheet written to delimited outputs (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Dump {
            target,
            range,
            delimiter,
        } => dump(&target, range, delimiter),
        Commands::Cell {
            target,
            row,
            column,
        } => show_cell(&target, row, column),
        Commands::Convert {
            input,
            output,
            sheet,
        } => convert(&input, &output, sheet.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse_range(s: &str) -> std::result::Result<RangeRequest, String> {
    let bounds = s
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid range bound: {e}"))?;

    match bounds.as_slice() {
        &[row_begin, row_end, column_begin, column_end] => Ok(RangeRequest::new(
            row_begin,
            row_end,
            column_begin,
            column_end,
        )),
        _ => Err(format!("expected 4 comma-separated bounds, got {}", bounds.len())),
    }
}

fn open_session(input: &Path, header: bool, read_only: bool) -> Result<MemorySession> {
    let options = SessionOptions::new()
        .with_header_row(header)
        .with_read_only(read_only);
    let mut session = Session::in_memory_with(options);
    session
        .open(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    Ok(session)
}

fn select_sheet(session: &mut MemorySession, name: Option<&str>) -> Result<()> {
    if let Some(name) = name {
        if !session.activate_sheet(name)? {
            bail!("Sheet '{}' not found", name);
        }
    }
    Ok(())
}

fn open_target(target: &Target) -> Result<MemorySession> {
    let mut session = open_session(&target.input, target.header, true)?;
    select_sheet(&mut session, target.sheet.as_deref())?;
    Ok(session)
}

fn list_sheets(input: &Path) -> Result<()> {
    let mut session = open_session(input, false, true)?;
    let names = session.sheet_names()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (index, name) in names.iter().enumerate() {
        writeln!(out, "{}\t{}", index, name)?;
    }
    Ok(())
}

fn dump(target: &Target, range: Option<RangeRequest>, delimiter: char) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character");
    }

    let mut session = open_target(target)?;
    let table = match range {
        Some(r) => session.range_values(r.row_begin, r.row_end, r.column_begin, r.column_end)?,
        None => session.sheet_data()?,
    };

    // a one-cell sheet comes back as a single value, not a table
    let table = if table.is_empty() && range.is_none() && !session.is_cell_empty(0, 0)? {
        TabularValues::from_rows(vec![vec![session.cell_value(0, 0)?]])
    } else {
        table
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(io::stdout().lock());
    for row in &table {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn show_cell(target: &Target, row: u32, column: u32) -> Result<()> {
    let mut session = open_target(target)?;

    let value = session.cell_value(row, column)?;
    let background = session.cell_background_color(row, column)?;
    let font = session.cell_font_color(row, column)?;
    let number_format = session.cell_number_format(row, column)?;

    println!("value: {}", value);
    println!("background: {}", background);
    println!("font: {}", font);
    println!("number format: {}", number_format);
    Ok(())
}

fn convert(input: &Path, output: &Path, sheet: Option<&str>) -> Result<()> {
    let mut session = open_session(input, false, false)?;
    select_sheet(&mut session, sheet)?;
    session
        .save_as(output)
        .with_context(|| format!("Failed to write '{}'", output.display()))?;

    tracing::info!("Converted {} to {}", input.display(), output.display());
    Ok(())
}
