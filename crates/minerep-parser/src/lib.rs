//! # minerep-parser
//!
//! Input side of the minerep pipeline: loads a production spreadsheet and
//! normalizes it into the tidy long-format table defined in `minerep-core`.
//!
//! This crate provides:
//! - Month label parsing for Spanish/English column headers ("ene-20")
//! - Workbook loading via calamine with header-row detection
//! - Normalization of the wide metric table into `TidyTable`
//!
//! ## Example
//!
//! ```rust
//! use minerep_parser::parse_month_label;
//!
//! let date = parse_month_label("ene-20").unwrap();
//! assert_eq!((date.format("%Y-%m")).to_string(), "2020-01");
//! assert!(parse_month_label("xyz-99").is_none());
//! ```

pub mod labels;
pub mod sheet;

pub use labels::parse_month_label;
pub use sheet::normalize_rows;

use std::path::Path;
use thiserror::Error;

/// Whole-file loading error. Per-column and per-cell problems are recovered
/// during normalization and never surface here.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open spreadsheet: {0}")]
    Open(#[from] calamine::Error),

    #[error("Workbook has no sheets")]
    NoSheets,

    #[error("Sheet '{name}' not found (available: {available})")]
    SheetNotFound { name: String, available: String },

    #[error("The specified sheet is empty")]
    EmptySheet,

    #[error("No parseable date columns found in the header row")]
    NoDateColumns,

    #[error("No numeric data found after normalization")]
    NoNumericData,
}

/// Load a workbook and normalize the requested sheet (or the first sheet)
/// into a tidy table.
pub fn load_table(
    path: &Path,
    sheet_name: Option<&str>,
) -> Result<minerep_core::TidyTable, LoadError> {
    sheet::load(path, sheet_name)
}
