//! The fixed chart catalog.
//!
//! Charts are grouped into four named sets, each written to its own sheet
//! of the report. The catalog is module-level constant data: it is the same
//! for every run and is never mutated. A spec that references a series
//! absent from the loaded dataset is skipped at render time; the groups and
//! their sheets always exist.

/// The four chart groups, in report sheet order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartGroup {
    ProductionOverview,
    EfficiencyAnalysis,
    ComparativeAnalysis,
    TrendAnalysis,
}

impl ChartGroup {
    pub const ALL: [ChartGroup; 4] = [
        ChartGroup::ProductionOverview,
        ChartGroup::EfficiencyAnalysis,
        ChartGroup::ComparativeAnalysis,
        ChartGroup::TrendAnalysis,
    ];

    /// Sheet name used in the report workbook.
    pub fn sheet_name(self) -> &'static str {
        match self {
            ChartGroup::ProductionOverview => "Production Overview",
            ChartGroup::EfficiencyAnalysis => "Efficiency Analysis",
            ChartGroup::ComparativeAnalysis => "Comparative Analysis",
            ChartGroup::TrendAnalysis => "Trend Analysis",
        }
    }
}

/// Chart shape plus the aggregate series it draws from.
///
/// Series are referenced by the names the aggregation stage produces
/// (base series as "Metric/Category", derived series by their KPI name).
#[derive(Clone, Copy, Debug)]
pub enum ChartKind {
    /// Date-axis line chart; values multiplied by `y_scale` before drawing
    Line {
        series: &'static [&'static str],
        y_scale: f64,
    },
    /// Date-axis stacked bars, first series at the bottom
    StackedBars { series: &'static [&'static str] },
    /// Side-by-side bars per month, keeping every `sample_every`-th month
    GroupedBars {
        series: &'static [&'static str],
        sample_every: usize,
    },
    /// Pie over the whole-period sums of the given series
    Pie { series: &'static [&'static str] },
    /// Grouped bars of avg / max / total-in-thousands per series
    StatBars { series: &'static [&'static str] },
    /// Grouped bars of per-calendar-year totals
    YearlyBars { series: &'static [&'static str] },
    /// Bars of per-calendar-month means of one series
    SeasonalityBars { series: &'static str },
    /// One series plus its moving averages over the given windows
    MovingAverages {
        series: &'static str,
        windows: &'static [usize],
    },
    /// Scatter of two series joined on date, with a least-squares trend line
    Scatter {
        x: &'static str,
        y: &'static str,
        y_scale: f64,
    },
    /// Bars on the primary axis, a line on the secondary axis
    DualAxis {
        bars: &'static str,
        line: &'static str,
        y2_label: &'static str,
    },
}

/// Static description of one chart.
#[derive(Clone, Copy, Debug)]
pub struct ChartSpec {
    pub group: ChartGroup,
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub kind: ChartKind,
}

const CATALOG: &[ChartSpec] = &[
    // ---- Production Overview ----
    ChartSpec {
        group: ChartGroup::ProductionOverview,
        title: "Ore Production Over Time",
        x_label: "Date",
        y_label: "Ore Mined (kt)",
        kind: ChartKind::Line {
            series: &["Ore Mined/RGM", "Ore Mined/Sar"],
            y_scale: 1.0,
        },
    },
    ChartSpec {
        group: ChartGroup::ProductionOverview,
        title: "Overburden Movement",
        x_label: "Date",
        y_label: "Overburden (kt)",
        kind: ChartKind::Line {
            series: &["Overburden/RGM", "Overburden/Sar"],
            y_scale: 1.0,
        },
    },
    ChartSpec {
        group: ChartGroup::ProductionOverview,
        title: "Total Material Movement",
        x_label: "Date",
        y_label: "Material (kt)",
        kind: ChartKind::StackedBars {
            series: &["Total Ore (kt)", "Total Overburden (kt)"],
        },
    },
    ChartSpec {
        group: ChartGroup::ProductionOverview,
        title: "Stripping Ratio Trends",
        x_label: "Date",
        y_label: "Strip Ratio",
        kind: ChartKind::Line {
            series: &["Strip Ratio/RGM", "Strip Ratio/Sar"],
            y_scale: 1.0,
        },
    },
    // ---- Efficiency Analysis ----
    ChartSpec {
        group: ChartGroup::EfficiencyAnalysis,
        title: "Fleet Utilization vs Production",
        x_label: "Date",
        y_label: "Ore Production (kt)",
        kind: ChartKind::DualAxis {
            bars: "Total Ore (kt)",
            line: "Active Fleet Count (Aprox)",
            y2_label: "Fleet Count",
        },
    },
    ChartSpec {
        group: ChartGroup::EfficiencyAnalysis,
        title: "Diesel Consumption Trend",
        x_label: "Date",
        y_label: "Diesel (Million Liters)",
        kind: ChartKind::Line {
            series: &["Liter of Diesel Consumed"],
            y_scale: 1e-6,
        },
    },
    ChartSpec {
        group: ChartGroup::EfficiencyAnalysis,
        title: "Productivity per Fleet Unit",
        x_label: "Date",
        y_label: "kt per Fleet",
        kind: ChartKind::Line {
            series: &["Productivity (kt per Fleet)"],
            y_scale: 1.0,
        },
    },
    ChartSpec {
        group: ChartGroup::EfficiencyAnalysis,
        title: "Fuel Efficiency",
        x_label: "Date",
        y_label: "Liters per kt",
        kind: ChartKind::Line {
            series: &["Fuel Efficiency (L per kt)"],
            y_scale: 1.0,
        },
    },
    // ---- Comparative Analysis ----
    ChartSpec {
        group: ChartGroup::ComparativeAnalysis,
        title: "Total Ore Production Share",
        x_label: "",
        y_label: "",
        kind: ChartKind::Pie {
            series: &["Ore Mined/RGM", "Ore Mined/Sar"],
        },
    },
    ChartSpec {
        group: ChartGroup::ComparativeAnalysis,
        title: "Ore Production Comparison",
        x_label: "Date",
        y_label: "Ore Mined (kt)",
        kind: ChartKind::GroupedBars {
            series: &["Ore Mined/RGM", "Ore Mined/Sar"],
            sample_every: 3,
        },
    },
    ChartSpec {
        group: ChartGroup::ComparativeAnalysis,
        title: "Total Overburden Share",
        x_label: "",
        y_label: "",
        kind: ChartKind::Pie {
            series: &["Overburden/RGM", "Overburden/Sar"],
        },
    },
    ChartSpec {
        group: ChartGroup::ComparativeAnalysis,
        title: "Performance Metrics",
        x_label: "",
        y_label: "Value",
        kind: ChartKind::StatBars {
            series: &["Ore Mined/RGM", "Ore Mined/Sar"],
        },
    },
    // ---- Trend Analysis ----
    ChartSpec {
        group: ChartGroup::TrendAnalysis,
        title: "Ore Production Moving Averages",
        x_label: "Date",
        y_label: "Ore Mined (kt)",
        kind: ChartKind::MovingAverages {
            series: "Ore Mined/RGM",
            windows: &[3, 6],
        },
    },
    ChartSpec {
        group: ChartGroup::TrendAnalysis,
        title: "Yearly Production Comparison",
        x_label: "Year",
        y_label: "Total Ore (kt)",
        kind: ChartKind::YearlyBars {
            series: &["Ore Mined/RGM", "Ore Mined/Sar"],
        },
    },
    ChartSpec {
        group: ChartGroup::TrendAnalysis,
        title: "Fleet Count vs Diesel Consumption",
        x_label: "Fleet Count",
        y_label: "Diesel (Million L)",
        kind: ChartKind::Scatter {
            x: "Active Fleet Count (Aprox)",
            y: "Liter of Diesel Consumed",
            y_scale: 1e-6,
        },
    },
    ChartSpec {
        group: ChartGroup::TrendAnalysis,
        title: "Monthly Seasonality",
        x_label: "Month",
        y_label: "Average Ore (kt)",
        kind: ChartKind::SeasonalityBars {
            series: "Ore Mined/RGM",
        },
    },
];

/// The fixed chart catalog, in render order.
pub fn catalog() -> &'static [ChartSpec] {
    CATALOG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_group_has_charts() {
        for group in ChartGroup::ALL {
            assert!(
                catalog().iter().any(|spec| spec.group == group),
                "group {group:?} has no chart specs"
            );
        }
    }

    #[test]
    fn titles_are_unique() {
        let titles: Vec<_> = catalog().iter().map(|s| s.title).collect();
        let mut deduped = titles.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(titles.len(), deduped.len());
    }

    #[test]
    fn sheet_names_fit_excel_limits() {
        // Worksheet names are capped at 31 characters
        for group in ChartGroup::ALL {
            assert!(group.sheet_name().len() <= 31);
        }
    }
}
