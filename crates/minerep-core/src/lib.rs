//! # minerep-core
//!
//! Core domain model for the minerep reporting utility.
//!
//! This crate provides:
//! - Domain types: `TidyRecord`, `TidyTable`, `Series`, `Summary`
//! - Wide-table reshaping for the Processed_Data sheet
//! - Error types shared by the rendering and report-writing stages
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use minerep_core::{TidyRecord, TidyTable};
//!
//! let mut table = TidyTable::new();
//! table.push(TidyRecord {
//!     date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
//!     metric: "Ore Mined".into(),
//!     category: Some("RGM".into()),
//!     unit: Some("kt".into()),
//!     value: 406.8,
//! });
//! table.sort();
//! assert_eq!(table.months_covered(), 1);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

// ============================================================================
// Tidy records
// ============================================================================

/// One observation: a metric value for one calendar month.
///
/// The `date` is always a real, resolved month (pinned to day 1). Columns
/// whose header could not be parsed never produce a record, so a record
/// with an ambiguous or placeholder date cannot exist.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TidyRecord {
    /// First day of the observed month
    pub date: NaiveDate,
    /// Metric name, e.g. "Ore Mined"
    pub metric: String,
    /// Category label, e.g. "RGM"; `None` for aggregate metrics
    pub category: Option<String>,
    /// Unit label, e.g. "kt"
    pub unit: Option<String>,
    /// Observed value; 0.0 when the source cell was blank or non-numeric
    pub value: f64,
}

impl TidyRecord {
    /// Grouping key used for ordering and series extraction
    pub fn key(&self) -> (NaiveDate, &str, Option<&str>) {
        (self.date, self.metric.as_str(), self.category.as_deref())
    }
}

/// The normalized long-format table produced from one input sheet.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TidyTable {
    /// Records, ordered by (date, metric, category) after `sort`
    pub records: Vec<TidyRecord>,
    /// Number of blank or non-numeric cells that were zero-filled
    pub filled_cells: usize,
}

impl TidyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: TidyRecord) {
        self.records.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Sort into the canonical (date, metric, category) order.
    pub fn sort(&mut self) {
        self.records.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then_with(|| a.metric.cmp(&b.metric))
                .then_with(|| a.category.cmp(&b.category))
        });
    }

    /// Distinct months present, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.records.iter().map(|r| r.date).collect();
        dates.sort_unstable();
        dates.dedup();
        dates
    }

    pub fn months_covered(&self) -> usize {
        self.dates().len()
    }

    /// Distinct (metric, category, unit) triples in first-seen order.
    pub fn metric_keys(&self) -> Vec<MetricKey> {
        let mut keys: Vec<MetricKey> = Vec::new();
        for r in &self.records {
            let key = MetricKey {
                metric: r.metric.clone(),
                category: r.category.clone(),
                unit: r.unit.clone(),
            };
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    /// Extract the chronological series for one (metric, category) pair.
    ///
    /// Duplicate dates collapse to the last record in table order.
    pub fn series(&self, metric: &str, category: Option<&str>) -> Series {
        let mut points = BTreeMap::new();
        for r in &self.records {
            if r.metric == metric && r.category.as_deref() == category {
                points.insert(r.date, r.value);
            }
        }
        let name = match category {
            Some(cat) => format!("{metric}/{cat}"),
            None => metric.to_string(),
        };
        Series { name, points }
    }

    /// Reshape to a wide table: one row per month, one column per metric key.
    ///
    /// Months where a metric has no record get 0.0, mirroring the zero-fill
    /// applied during normalization.
    pub fn to_wide(&self) -> WideTable {
        let keys = self.metric_keys();
        let dates = self.dates();

        let mut values: BTreeMap<(NaiveDate, usize), f64> = BTreeMap::new();
        for r in &self.records {
            if let Some(col) = keys.iter().position(|k| {
                k.metric == r.metric && k.category == r.category && k.unit == r.unit
            }) {
                values.insert((r.date, col), r.value);
            }
        }

        let rows = dates
            .into_iter()
            .map(|date| {
                let cells = (0..keys.len())
                    .map(|col| values.get(&(date, col)).copied().unwrap_or(0.0))
                    .collect();
                WideRow { date, cells }
            })
            .collect();

        WideTable { columns: keys, rows }
    }
}

/// Identity of one metric column in the wide layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricKey {
    pub metric: String,
    pub category: Option<String>,
    pub unit: Option<String>,
}

impl MetricKey {
    /// Human-readable column heading, e.g. "Ore Mined - RGM - kt".
    pub fn heading(&self) -> String {
        let mut parts = vec![self.metric.as_str()];
        if let Some(cat) = self.category.as_deref() {
            parts.push(cat);
        }
        if let Some(unit) = self.unit.as_deref() {
            parts.push(unit);
        }
        parts.join(" - ")
    }
}

/// One month of the wide layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WideRow {
    pub date: NaiveDate,
    pub cells: Vec<f64>,
}

/// The tidy table reshaped for human-readable output.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WideTable {
    pub columns: Vec<MetricKey>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    /// Flatten back into a tidy table.
    ///
    /// Round-trip invariant: `table.to_wide().to_tidy()` holds the same set
    /// of (date, metric, category, value) records as a zero-filled `table`.
    pub fn to_tidy(&self) -> TidyTable {
        let mut table = TidyTable::new();
        for row in &self.rows {
            for (key, &value) in self.columns.iter().zip(&row.cells) {
                table.push(TidyRecord {
                    date: row.date,
                    metric: key.metric.clone(),
                    category: key.category.clone(),
                    unit: key.unit.clone(),
                    value,
                });
            }
        }
        table.sort();
        table
    }
}

// ============================================================================
// Series
// ============================================================================

/// A named monthly series, chronologically ordered by construction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: BTreeMap<NaiveDate, f64>,
}

impl Series {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: BTreeMap::new(),
        }
    }

    pub fn from_points(
        name: impl Into<String>,
        points: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        Self {
            name: name.into(),
            points: points.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    pub fn sum(&self) -> f64 {
        self.points.values().sum()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            None
        } else {
            Some(self.sum() / self.points.len() as f64)
        }
    }

    pub fn max(&self) -> Option<f64> {
        self.points.values().copied().fold(None, |acc, v| {
            Some(match acc {
                Some(m) if m >= v => m,
                _ => v,
            })
        })
    }

    /// Points as (date, value) pairs, ascending by date.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.points.iter().map(|(d, v)| (*d, *v))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.keys().next_back().copied()
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Per-metric statistics shown on the Summary sheet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricStat {
    pub heading: String,
    pub total: f64,
    pub mean: f64,
    pub max: f64,
}

/// Run-level statistics for the Summary sheet.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Summary {
    pub months_covered: usize,
    pub first_month: Option<NaiveDate>,
    pub last_month: Option<NaiveDate>,
    pub filled_cells: usize,
    pub metrics: Vec<MetricStat>,
}

impl Summary {
    pub fn from_table(table: &TidyTable) -> Self {
        let dates = table.dates();
        let metrics = table
            .metric_keys()
            .into_iter()
            .map(|key| {
                let series = table.series(&key.metric, key.category.as_deref());
                MetricStat {
                    heading: key.heading(),
                    total: series.sum(),
                    mean: series.mean().unwrap_or(0.0),
                    max: series.max().unwrap_or(0.0),
                }
            })
            .collect();

        Self {
            months_covered: dates.len(),
            first_month: dates.first().copied(),
            last_month: dates.last().copied(),
            filled_cells: table.filled_cells,
            metrics,
        }
    }

    /// Date range label, e.g. "Jan 2020 to Dec 2022".
    pub fn date_range(&self) -> Option<String> {
        match (self.first_month, self.last_month) {
            (Some(first), Some(last)) => Some(format!(
                "{} to {}",
                first.format("%b %Y"),
                last.format("%b %Y")
            )),
            _ => None,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Chart rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart backend error: {0}")]
    Backend(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Report workbook error
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(String),

    #[error("No data to report")]
    NoData,
}

// ============================================================================
// Tests
// ============================================================================
