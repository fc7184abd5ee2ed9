//! minerep CLI - Mining Production Reporting
//!
//! Reads a monthly production spreadsheet, computes derived KPIs, renders
//! the chart catalog and writes the report workbook.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod pipeline;

#[derive(Parser)]
#[command(name = "minerep")]
#[command(author, version, about = "Monthly mining production report generator", long_about = None)]
struct Cli {
    /// Input spreadsheet; prompts interactively when omitted
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Sheet to read (defaults to the first sheet)
    #[arg(value_name = "SHEET")]
    sheet: Option<String>,

    /// Output path (defaults to <input>_with_charts.xlsx)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let input = match cli.input {
        Some(path) => path,
        None => pipeline::prompt_for_input()?,
    };

    let output = pipeline::run(&input, cli.sheet.as_deref(), cli.output.as_deref())?;

    println!("Report complete.");
    println!("Output: {}", output.display());
    Ok(())
}
