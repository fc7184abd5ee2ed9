//! Workbook loading and normalization.
//!
//! The input sheet is a wide table: the first three columns carry metric,
//! category and unit labels; every following column is one month. Files in
//! the field are messy — banner rows above the header, blank cells,
//! European decimal formatting, columns whose header is not a month at all.
//! Each of those is recovered per row/column/cell here; only whole-file
//! problems become `LoadError`s.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Datelike, NaiveDate};
use minerep_core::{TidyRecord, TidyTable};
use std::path::Path;
use tracing::{debug, warn};

use crate::labels::parse_month_label;
use crate::LoadError;

/// Metric, category and unit label columns precede the date columns.
const ID_COLUMNS: usize = 3;

/// Rows scanned from the top when looking for the header row.
const HEADER_SCAN_ROWS: usize = 10;

pub(crate) fn load(path: &Path, sheet_name: Option<&str>) -> Result<TidyTable, LoadError> {
    let mut workbook = open_workbook_auto(path)?;

    let names = workbook.sheet_names().to_owned();
    if names.is_empty() {
        return Err(LoadError::NoSheets);
    }
    debug!(sheets = ?names, "opened workbook");

    let selected = match sheet_name {
        Some(name) => {
            if !names.iter().any(|n| n == name) {
                return Err(LoadError::SheetNotFound {
                    name: name.to_string(),
                    available: names.join(", "),
                });
            }
            name.to_string()
        }
        None => names[0].clone(),
    };
    debug!(sheet = %selected, "reading sheet");

    let range = workbook.worksheet_range(&selected)?;
    let rows: Vec<Vec<Data>> = range.rows().map(<[Data]>::to_vec).collect();
    normalize_rows(&rows)
}

/// Normalize raw sheet rows into a tidy table.
///
/// Columns whose header does not resolve to a month are skipped for every
/// row. Blank or non-numeric cells under resolved months become 0.0 and are
/// counted in `filled_cells`. Rows with no metric label, and rows whose
/// values are zero across every resolved month, are dropped.
pub fn normalize_rows(rows: &[Vec<Data>]) -> Result<TidyTable, LoadError> {
    if rows.is_empty() {
        return Err(LoadError::EmptySheet);
    }

    let header_idx = rows
        .iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| row.iter().any(|cell| header_month(cell).is_some()))
        .ok_or(LoadError::NoDateColumns)?;
    if header_idx > 0 {
        debug!(skipped_rows = header_idx, "header row found below top of sheet");
    }

    let header = &rows[header_idx];
    let mut date_columns: Vec<(usize, NaiveDate)> = Vec::new();
    for (idx, cell) in header.iter().enumerate().skip(ID_COLUMNS) {
        match header_month(cell) {
            Some(date) => date_columns.push((idx, date)),
            None => {
                if !matches!(cell, Data::Empty) {
                    warn!(header = %cell, "column header is not a month label; column skipped");
                }
            }
        }
    }
    if date_columns.is_empty() {
        return Err(LoadError::NoDateColumns);
    }

    let mut table = TidyTable::new();
    for row in &rows[header_idx + 1..] {
        let Some(metric) = text_cell(row.first()) else {
            continue;
        };
        let category = text_cell(row.get(1));
        let unit = text_cell(row.get(2));

        let mut values: Vec<(NaiveDate, f64, bool)> = Vec::with_capacity(date_columns.len());
        for &(col, date) in &date_columns {
            let cell = row.get(col).unwrap_or(&Data::Empty);
            match coerce_number(cell) {
                Some(value) => values.push((date, value, false)),
                None => values.push((date, 0.0, true)),
            }
        }

        if values.iter().all(|(_, v, _)| *v == 0.0) {
            debug!(metric = %metric, "row has no nonzero values; dropped");
            continue;
        }

        for (date, value, filled) in values {
            if filled {
                table.filled_cells += 1;
            }
            table.push(TidyRecord {
                date,
                metric: metric.clone(),
                category: category.clone(),
                unit: unit.clone(),
                value,
            });
        }
    }

    if table.is_empty() {
        return Err(LoadError::NoNumericData);
    }

    table.sort();
    debug!(
        records = table.len(),
        months = table.months_covered(),
        filled = table.filled_cells,
        "sheet normalized"
    );
    Ok(table)
}

/// Resolve a header cell to a month. String headers go through the label
/// parser; cells the spreadsheet itself already stored as dates are used
/// directly.
fn header_month(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::String(s) => parse_month_label(s),
        Data::DateTime(dt) => {
            let date = dt.as_datetime()?.date();
            NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        }
        Data::DateTimeIso(s) => {
            let prefix = s.get(..10).unwrap_or(s);
            let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?;
            NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        }
        _ => None,
    }
}

/// Coerce a data cell to f64. Strings tolerate European formatting
/// (thousands '.', decimal ','). `None` means the cell gets zero-filled.
fn coerce_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_number_str(s),
        _ => None,
    }
}

fn parse_number_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<f64>() {
        return Some(value);
    }
    // European formatting: "1.234,5" -> 1234.5
    let cleaned = trimmed.replace('.', "").replace(',', ".");
    cleaned.parse::<f64>().ok()
}

/// Label cell to trimmed text; blank and placeholder cells become `None`.
fn text_cell(cell: Option<&Data>) -> Option<String> {
    let cell = cell?;
    if matches!(cell, Data::Empty) {
        return None;
    }
    let text = cell.to_string().trim().to_string();
    match text.to_lowercase().as_str() {
        "" | "nan" | "none" => None,
        _ => Some(text),
    }
}
