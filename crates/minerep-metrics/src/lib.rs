//! # minerep-metrics
//!
//! Pure aggregation over the tidy table: base series per (metric, category)
//! pair, derived KPI series (totals, stripping ratios, productivity, fuel
//! efficiency), moving averages and the small statistics the trend charts
//! need. No I/O happens here.
//!
//! Ratio semantics: a date where the denominator is absent or exactly zero
//! produces no point at all — never 0, never infinity. Moving averages use
//! trailing windows and start at the first date with a full window.

use chrono::Datelike;
use minerep_core::{Series, TidyTable};
use std::collections::BTreeMap;
use tracing::debug;

/// Metric-name fragments used to recognize the well-known input rows.
/// Matching is by substring, so "Ore Mined" also matches a row labelled
/// "Ore Mined " or "Total Ore Mined".
pub const ORE_FRAGMENT: &str = "Ore Mined";
pub const OVERBURDEN_FRAGMENT: &str = "Overburden";
pub const FLEET_FRAGMENT: &str = "Fleet";
pub const DIESEL_FRAGMENT: &str = "Diesel";

/// Moving-average windows produced for every ore series, in months.
pub const MA_WINDOWS: [usize; 2] = [3, 6];

// ============================================================================
// Aggregate set
// ============================================================================

/// Named series map produced by [`aggregate`]. Keys equal each series' name.
#[derive(Clone, Debug, Default)]
pub struct AggregateSet {
    series: BTreeMap<String, Series>,
}

impl AggregateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: Series) {
        self.series.insert(series.name.clone(), series);
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

// ============================================================================
// Combining rules
// ============================================================================

/// How two series combine into a derived series.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combine {
    /// lhs ÷ rhs; dates with a zero or absent denominator are omitted
    Ratio,
    /// lhs + rhs over the union of dates; a missing side contributes 0
    Sum,
    /// lhs − rhs over the union of dates; a missing side contributes 0
    Difference,
}

/// Combine two series point-wise under the given rule.
pub fn combine(name: impl Into<String>, lhs: &Series, rhs: &Series, op: Combine) -> Series {
    let mut out = Series::new(name);
    match op {
        Combine::Ratio => {
            for (date, numerator) in lhs.iter() {
                match rhs.get(date) {
                    Some(denominator) if denominator != 0.0 => {
                        out.points.insert(date, numerator / denominator);
                    }
                    _ => {}
                }
            }
        }
        Combine::Sum | Combine::Difference => {
            let mut dates: Vec<_> = lhs.points.keys().chain(rhs.points.keys()).copied().collect();
            dates.sort_unstable();
            dates.dedup();
            for date in dates {
                let a = lhs.get(date).unwrap_or(0.0);
                let b = rhs.get(date).unwrap_or(0.0);
                let value = match op {
                    Combine::Sum => a + b,
                    Combine::Difference => a - b,
                    Combine::Ratio => unreachable!(),
                };
                out.points.insert(date, value);
            }
        }
    }
    out
}

/// Sum every category series of one metric into a single series.
fn sum_categories(table: &TidyTable, fragment: &str, name: &str) -> Option<Series> {
    let keys: Vec<_> = table
        .metric_keys()
        .into_iter()
        .filter(|k| k.metric.contains(fragment))
        .collect();
    if keys.is_empty() {
        return None;
    }

    let mut total = Series::new(name);
    for key in keys {
        let part = table.series(&key.metric, key.category.as_deref());
        total = combine(name, &total, &part, Combine::Sum);
    }
    Some(total)
}

// ============================================================================
// Aggregation
// ============================================================================

/// Compute every base and derived series for one tidy table.
///
/// Derived series whose inputs are absent from this dataset are simply not
/// produced; chart specs referencing them are skipped downstream.
pub fn aggregate(table: &TidyTable) -> AggregateSet {
    let mut set = AggregateSet::new();

    // Base series, one per (metric, category) pair
    for key in table.metric_keys() {
        set.insert(table.series(&key.metric, key.category.as_deref()));
    }

    let fleet = find_series(table, FLEET_FRAGMENT);
    let diesel = find_series(table, DIESEL_FRAGMENT);

    // Totals across categories
    let total_ore = sum_categories(table, ORE_FRAGMENT, "Total Ore (kt)");
    let total_overburden = sum_categories(table, OVERBURDEN_FRAGMENT, "Total Overburden (kt)");
    if let Some(ore) = &total_ore {
        set.insert(ore.clone());
    }
    if let Some(overburden) = &total_overburden {
        set.insert(overburden.clone());
    }
    let total_material = match (&total_ore, &total_overburden) {
        (Some(ore), Some(overburden)) => {
            let material = combine("Total Material (kt)", ore, overburden, Combine::Sum);
            set.insert(material.clone());
            Some(material)
        }
        (Some(only), None) | (None, Some(only)) => {
            let mut material = only.clone();
            material.name = "Total Material (kt)".into();
            set.insert(material.clone());
            Some(material)
        }
        (None, None) => None,
    };

    // Per-category stripping ratios: overburden ÷ ore
    for key in table.metric_keys() {
        if !key.metric.contains(OVERBURDEN_FRAGMENT) {
            continue;
        }
        let Some(category) = key.category.as_deref() else {
            continue;
        };
        let overburden = table.series(&key.metric, Some(category));
        let ore_key = table
            .metric_keys()
            .into_iter()
            .find(|k| k.metric.contains(ORE_FRAGMENT) && k.category.as_deref() == Some(category));
        if let Some(ore_key) = ore_key {
            let ore = table.series(&ore_key.metric, Some(category));
            set.insert(combine(
                format!("Strip Ratio/{category}"),
                &overburden,
                &ore,
                Combine::Ratio,
            ));
        }
    }

    // Fleet and fuel KPIs
    if let (Some(ore), Some(fleet)) = (&total_ore, &fleet) {
        set.insert(combine(
            "Productivity (kt per Fleet)",
            ore,
            fleet,
            Combine::Ratio,
        ));
    }
    if let (Some(diesel), Some(ore)) = (&diesel, &total_ore) {
        set.insert(combine(
            "Fuel Efficiency (L per kt)",
            diesel,
            ore,
            Combine::Ratio,
        ));
    }
    if let (Some(material), Some(diesel)) = (&total_material, &diesel) {
        set.insert(combine(
            "Efficiency (kt per Liter)",
            material,
            diesel,
            Combine::Ratio,
        ));
    }

    // Moving averages over each ore series
    for key in table.metric_keys() {
        if !key.metric.contains(ORE_FRAGMENT) {
            continue;
        }
        let base = table.series(&key.metric, key.category.as_deref());
        for window in MA_WINDOWS {
            set.insert(moving_average(&base, window));
        }
    }

    debug!(series = set.len(), "aggregation complete");
    set
}

/// First base series whose metric name contains the fragment.
fn find_series(table: &TidyTable, fragment: &str) -> Option<Series> {
    table
        .metric_keys()
        .into_iter()
        .find(|k| k.metric.contains(fragment))
        .map(|k| table.series(&k.metric, k.category.as_deref()))
}

// ============================================================================
// Trend statistics
// ============================================================================

/// Trailing moving average. The result has no value for the first
/// `window − 1` dates and the exact mean of the trailing `window` points
/// from then on.
pub fn moving_average(series: &Series, window: usize) -> Series {
    let name = format!("{} ({}M MA)", series.name, window);
    let mut out = Series::new(name);
    if window == 0 {
        return out;
    }

    let points: Vec<_> = series.iter().collect();
    for i in (window - 1)..points.len() {
        let sum: f64 = points[i + 1 - window..=i].iter().map(|(_, v)| v).sum();
        out.points.insert(points[i].0, sum / window as f64);
    }
    out
}

/// Per-calendar-year totals, ascending by year.
pub fn yearly_totals(series: &Series) -> Vec<(i32, f64)> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for (date, value) in series.iter() {
        *totals.entry(date.year()).or_insert(0.0) += value;
    }
    totals.into_iter().collect()
}

/// Mean value per calendar month (1..=12); months with no data are 0.0.
pub fn monthly_means(series: &Series) -> Vec<(u32, f64)> {
    let mut sums = [0.0f64; 12];
    let mut counts = [0usize; 12];
    for (date, value) in series.iter() {
        let idx = (date.month() - 1) as usize;
        sums[idx] += value;
        counts[idx] += 1;
    }
    (0..12)
        .map(|idx| {
            let mean = if counts[idx] > 0 {
                sums[idx] / counts[idx] as f64
            } else {
                0.0
            };
            (idx as u32 + 1, mean)
        })
        .collect()
}

/// Least-squares fit y = slope·x + intercept. `None` with fewer than two
/// points or a degenerate x range.
pub fn linear_fit(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xx: f64 = points.iter().map(|(x, _)| x * x).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some((slope, intercept))
}

// ============================================================================
// Tests
// ============================================================================
