//! PNG chart rendering via plotters.
//!
//! Each `ChartSpec` renders to one PNG file. A spec whose referenced series
//! are absent from the dataset, or whose primary series has fewer than two
//! points, is skipped without error. Rendering failures are isolated per
//! chart: `render_catalog` logs and moves on, so one bad chart never takes
//! the rest of the report down.

use chrono::{Duration, NaiveDate};
use minerep_core::{RenderError, Series};
use minerep_metrics::{linear_fit, monthly_means, yearly_totals, AggregateSet};
use plotters::coord::ranged1d::SegmentValue;
use plotters::element::Pie;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::catalog::{catalog, ChartGroup, ChartKind, ChartSpec};

/// Series colors, matching the palette of the report's house style.
const PALETTE: [RGBColor; 6] = [
    RGBColor(52, 152, 219),
    RGBColor(231, 76, 60),
    RGBColor(46, 204, 113),
    RGBColor(243, 156, 18),
    RGBColor(155, 89, 182),
    RGBColor(26, 188, 156),
];

/// Muted line used for "actual" values underneath moving averages.
const ACTUAL_COLOR: RGBColor = RGBColor(150, 150, 150);

/// A chart successfully rendered to disk.
#[derive(Clone, Debug)]
pub struct RenderedChart {
    pub group: ChartGroup,
    pub title: String,
    pub path: PathBuf,
}

/// Chart renderer configuration.
#[derive(Clone, Debug)]
pub struct ChartRenderer {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Font family for captions and labels
    pub font: String,
    /// Caption font size in pixels
    pub font_size: u32,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
            font: "sans-serif".into(),
            font_size: 24,
        }
    }
}

impl ChartRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure image width
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Configure image height
    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Render every catalog spec that has data, collecting the survivors.
    ///
    /// Per-chart failures are logged and skipped; sibling charts and other
    /// groups always keep rendering.
    pub fn render_catalog(&self, set: &AggregateSet, out_dir: &Path) -> Vec<RenderedChart> {
        let mut rendered = Vec::new();
        for spec in catalog() {
            match self.render_spec(spec, set, out_dir) {
                Ok(Some(path)) => rendered.push(RenderedChart {
                    group: spec.group,
                    title: spec.title.to_string(),
                    path,
                }),
                Ok(None) => debug!(chart = spec.title, "skipped: not enough data"),
                Err(err) => {
                    warn!(chart = spec.title, error = %err, "chart failed; continuing");
                }
            }
        }
        rendered
    }

    /// Render one spec. `Ok(None)` means the spec was skipped for lack of
    /// data; the data checks run before any backend is touched.
    pub fn render_spec(
        &self,
        spec: &ChartSpec,
        set: &AggregateSet,
        out_dir: &Path,
    ) -> Result<Option<PathBuf>, RenderError> {
        let path = out_dir.join(format!("{}.png", slug(spec.title)));
        let drew = match spec.kind {
            ChartKind::Line { series, y_scale } => {
                let styled: Vec<(&Series, RGBColor)> = drawable_series(set, series)
                    .into_iter()
                    .enumerate()
                    .map(|(i, s)| (s, PALETTE[i % PALETTE.len()]))
                    .collect();
                self.draw_lines(spec, &styled, y_scale, &path)?
            }
            ChartKind::StackedBars { series } => self.draw_stacked_bars(spec, set, series, &path)?,
            ChartKind::GroupedBars {
                series,
                sample_every,
            } => self.draw_sampled_bars(spec, set, series, sample_every, &path)?,
            ChartKind::Pie { series } => self.draw_pie(spec, set, series, &path)?,
            ChartKind::StatBars { series } => self.draw_stat_bars(spec, set, series, &path)?,
            ChartKind::YearlyBars { series } => self.draw_yearly_bars(spec, set, series, &path)?,
            ChartKind::SeasonalityBars { series } => {
                self.draw_seasonality(spec, set, series, &path)?
            }
            ChartKind::MovingAverages { series, windows } => {
                self.draw_moving_averages(spec, set, series, windows, &path)?
            }
            ChartKind::Scatter { x, y, y_scale } => self.draw_scatter(spec, set, x, y, y_scale, &path)?,
            ChartKind::DualAxis {
                bars,
                line,
                y2_label,
            } => self.draw_dual_axis(spec, set, bars, line, y2_label, &path)?,
        };
        Ok(drew.then_some(path))
    }

    // ------------------------------------------------------------------
    // Date-axis line charts
    // ------------------------------------------------------------------

    fn draw_lines(
        &self,
        spec: &ChartSpec,
        styled: &[(&Series, RGBColor)],
        y_scale: f64,
        path: &Path,
    ) -> Result<bool, RenderError> {
        if styled.is_empty() {
            return Ok(false);
        }
        let series: Vec<&Series> = styled.iter().map(|(s, _)| *s).collect();
        let Some((start, end)) = date_span(&series) else {
            return Ok(false);
        };
        let y_max = padded_max(series.iter().flat_map(|s| s.iter().map(|(_, v)| v * y_scale)));

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(spec.title, (self.font.as_str(), self.font_size))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d(start..end, 0f64..y_max)
            .map_err(backend)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label)
            .y_desc(spec.y_label)
            .x_labels(8)
            .x_label_formatter(&|d: &NaiveDate| d.format("%b-%y").to_string())
            .draw()
            .map_err(backend)?;

        for (s, color) in styled {
            let color = *color;
            chart
                .draw_series(LineSeries::new(
                    s.iter().map(|(d, v)| (d, v * y_scale)),
                    color.stroke_width(2),
                ))
                .map_err(backend)?
                .label(legend_label(&s.name))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                });
            chart
                .draw_series(
                    s.iter()
                        .map(|(d, v)| Circle::new((d, v * y_scale), 3, color.filled())),
                )
                .map_err(backend)?;
        }

        if styled.len() > 1 {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(backend)?;
        }

        root.present().map_err(backend)?;
        Ok(true)
    }

    fn draw_moving_averages(
        &self,
        spec: &ChartSpec,
        set: &AggregateSet,
        base_name: &str,
        windows: &[usize],
        path: &Path,
    ) -> Result<bool, RenderError> {
        let Some(base) = set.get(base_name) else {
            return Ok(false);
        };
        if base.len() < 2 {
            return Ok(false);
        }

        let mut styled: Vec<(&Series, RGBColor)> = vec![(base, ACTUAL_COLOR)];
        for (idx, window) in windows.iter().enumerate() {
            let name = format!("{} ({}M MA)", base_name, window);
            if let Some(ma) = set.get(&name) {
                if !ma.is_empty() {
                    styled.push((ma, PALETTE[(idx + 1) % PALETTE.len()]));
                }
            }
        }
        self.draw_lines(spec, &styled, 1.0, path)
    }

    // ------------------------------------------------------------------
    // Bar charts on a month axis
    // ------------------------------------------------------------------

    fn draw_stacked_bars(
        &self,
        spec: &ChartSpec,
        set: &AggregateSet,
        names: &[&str],
        path: &Path,
    ) -> Result<bool, RenderError> {
        let series = drawable_series(set, names);
        if series.is_empty() {
            return Ok(false);
        }
        let dates = union_dates(&series);
        if dates.len() < 2 {
            return Ok(false);
        }

        // Cumulative stack per month, bottom series first
        let mut stacks: Vec<Vec<f64>> = Vec::new();
        let mut running = vec![0.0; dates.len()];
        for s in &series {
            for (i, date) in dates.iter().enumerate() {
                running[i] += s.get(*date).unwrap_or(0.0);
            }
            stacks.push(running.clone());
        }
        let y_max = padded_max(stacks.last().into_iter().flatten().copied());

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(spec.title, (self.font.as_str(), self.font_size))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d((0..dates.len()).into_segmented(), 0f64..y_max)
            .map_err(backend)?;

        let label_dates = dates.clone();
        chart
            .configure_mesh()
            .x_desc(spec.x_label)
            .y_desc(spec.y_label)
            .x_labels(dates.len().min(12))
            .x_label_formatter(&move |v: &SegmentValue<usize>| {
                segment_index(v)
                    .and_then(|i| label_dates.get(i))
                    .map(|d| d.format("%b-%y").to_string())
                    .unwrap_or_default()
            })
            .draw()
            .map_err(backend)?;

        // Draw from the top of the stack down so lower layers stay visible
        for (layer, s) in series.iter().enumerate().rev() {
            let color = PALETTE[layer % PALETTE.len()];
            let tops = stacks[layer].clone();
            chart
                .draw_series(
                    Histogram::vertical(&chart)
                        .style(color.filled())
                        .margin(2)
                        .data(tops.iter().enumerate().map(|(i, v)| (i, *v))),
                )
                .map_err(backend)?
                .label(legend_label(&s.name))
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(backend)?;

        root.present().map_err(backend)?;
        Ok(true)
    }

    fn draw_sampled_bars(
        &self,
        spec: &ChartSpec,
        set: &AggregateSet,
        names: &[&str],
        sample_every: usize,
        path: &Path,
    ) -> Result<bool, RenderError> {
        let series = drawable_series(set, names);
        if series.is_empty() {
            return Ok(false);
        }
        let sampled: Vec<NaiveDate> = union_dates(&series)
            .into_iter()
            .step_by(sample_every.max(1))
            .collect();
        if sampled.len() < 2 {
            return Ok(false);
        }

        let group_labels: Vec<String> =
            sampled.iter().map(|d| d.format("%b-%y").to_string()).collect();
        let bars: Vec<(String, Vec<f64>)> = series
            .iter()
            .map(|s| {
                let values = sampled.iter().map(|d| s.get(*d).unwrap_or(0.0)).collect();
                (legend_label(&s.name).to_string(), values)
            })
            .collect();

        self.grouped_bar_chart(spec, &group_labels, &bars, None, path)?;
        Ok(true)
    }

    fn draw_stat_bars(
        &self,
        spec: &ChartSpec,
        set: &AggregateSet,
        names: &[&str],
        path: &Path,
    ) -> Result<bool, RenderError> {
        let series = drawable_series(set, names);
        if series.is_empty() {
            return Ok(false);
        }

        let group_labels = [
            "Avg (kt/month)".to_string(),
            "Max (kt)".to_string(),
            "Total (kt x1000)".to_string(),
        ];
        let bars: Vec<(String, Vec<f64>)> = series
            .iter()
            .map(|s| {
                let values = vec![
                    s.mean().unwrap_or(0.0),
                    s.max().unwrap_or(0.0),
                    s.sum() / 1000.0,
                ];
                (legend_label(&s.name).to_string(), values)
            })
            .collect();

        self.grouped_bar_chart(spec, &group_labels, &bars, None, path)?;
        Ok(true)
    }

    fn draw_yearly_bars(
        &self,
        spec: &ChartSpec,
        set: &AggregateSet,
        names: &[&str],
        path: &Path,
    ) -> Result<bool, RenderError> {
        let series = drawable_series(set, names);
        if series.is_empty() {
            return Ok(false);
        }

        let mut years: Vec<i32> = series
            .iter()
            .flat_map(|s| yearly_totals(s).into_iter().map(|(y, _)| y))
            .collect();
        years.sort_unstable();
        years.dedup();

        let group_labels: Vec<String> = years.iter().map(ToString::to_string).collect();
        let bars: Vec<(String, Vec<f64>)> = series
            .iter()
            .map(|s| {
                let totals = yearly_totals(s);
                let values = years
                    .iter()
                    .map(|year| {
                        totals
                            .iter()
                            .find(|(y, _)| y == year)
                            .map_or(0.0, |(_, total)| *total)
                    })
                    .collect();
                (legend_label(&s.name).to_string(), values)
            })
            .collect();

        self.grouped_bar_chart(spec, &group_labels, &bars, None, path)?;
        Ok(true)
    }

    fn draw_seasonality(
        &self,
        spec: &ChartSpec,
        set: &AggregateSet,
        name: &str,
        path: &Path,
    ) -> Result<bool, RenderError> {
        let Some(series) = set.get(name) else {
            return Ok(false);
        };
        if series.len() < 2 {
            return Ok(false);
        }

        const MONTH_NAMES: [&str; 12] = [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ];
        let means = monthly_means(series);
        let group_labels: Vec<String> = MONTH_NAMES.iter().map(ToString::to_string).collect();
        let values: Vec<f64> = means.iter().map(|(_, v)| *v).collect();

        let observed: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();
        let mean_line = if observed.is_empty() {
            None
        } else {
            Some(observed.iter().sum::<f64>() / observed.len() as f64)
        };

        let bars = vec![(legend_label(&series.name).to_string(), values)];
        self.grouped_bar_chart(spec, &group_labels, &bars, mean_line, path)?;
        Ok(true)
    }

    /// Shared grouped-bar implementation: one cluster of bars per group
    /// label, one bar color per series, optional horizontal mean line.
    fn grouped_bar_chart(
        &self,
        spec: &ChartSpec,
        group_labels: &[String],
        bars: &[(String, Vec<f64>)],
        mean_line: Option<f64>,
        path: &Path,
    ) -> Result<(), RenderError> {
        let groups = group_labels.len();
        let y_max = padded_max(bars.iter().flat_map(|(_, values)| values.iter().copied()));

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(spec.title, (self.font.as_str(), self.font_size))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d(-0.5f64..(groups as f64 - 0.5), 0f64..y_max)
            .map_err(backend)?;

        let labels = group_labels.to_vec();
        chart
            .configure_mesh()
            .x_desc(spec.x_label)
            .y_desc(spec.y_label)
            .x_labels(groups.min(12))
            .x_label_formatter(&move |x: &f64| {
                let idx = x.round();
                if (x - idx).abs() < 0.26 && idx >= 0.0 {
                    labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .draw()
            .map_err(backend)?;

        let bar_width = 0.8 / bars.len() as f64;
        for (k, (label, values)) in bars.iter().enumerate() {
            let color = PALETTE[k % PALETTE.len()];
            chart
                .draw_series(values.iter().enumerate().map(|(i, v)| {
                    let x0 = i as f64 - 0.4 + k as f64 * bar_width;
                    Rectangle::new([(x0, 0.0), (x0 + bar_width, *v)], color.filled())
                }))
                .map_err(backend)?
                .label(label.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
                });
        }

        if let Some(mean) = mean_line {
            let color = PALETTE[1];
            chart
                .draw_series(LineSeries::new(
                    vec![(-0.5, mean), (groups as f64 - 0.5, mean)],
                    color.stroke_width(2),
                ))
                .map_err(backend)?
                .label(format!("Overall Avg: {mean:.1}"))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                });
        }

        if bars.len() > 1 || mean_line.is_some() {
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(backend)?;
        }

        root.present().map_err(backend)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pies, scatters and dual-axis charts
    // ------------------------------------------------------------------

    fn draw_pie(
        &self,
        spec: &ChartSpec,
        set: &AggregateSet,
        names: &[&str],
        path: &Path,
    ) -> Result<bool, RenderError> {
        let mut sizes = Vec::new();
        let mut colors = Vec::new();
        let mut labels = Vec::new();
        for (idx, name) in names.iter().enumerate() {
            if let Some(series) = set.get(name) {
                let total = series.sum();
                if total > 0.0 {
                    sizes.push(total);
                    colors.push(PALETTE[idx % PALETTE.len()]);
                    labels.push(legend_label(name).to_string());
                }
            }
        }
        // A one-slice pie is degenerate; skip like any other thin chart
        if sizes.len() < 2 {
            return Ok(false);
        }

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;
        let root = root
            .titled(spec.title, (self.font.as_str(), self.font_size))
            .map_err(backend)?;

        let center = (self.width as i32 / 2, self.height as i32 / 2);
        let radius = f64::from(self.width.min(self.height)) * 0.32;
        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.label_style((self.font.as_str(), 18).into_font());
        pie.percentages((self.font.as_str(), 16).into_font());
        root.draw(&pie).map_err(backend)?;

        root.present().map_err(backend)?;
        Ok(true)
    }

    fn draw_scatter(
        &self,
        spec: &ChartSpec,
        set: &AggregateSet,
        x_name: &str,
        y_name: &str,
        y_scale: f64,
        path: &Path,
    ) -> Result<bool, RenderError> {
        let (Some(xs), Some(ys)) = (set.get(x_name), set.get(y_name)) else {
            return Ok(false);
        };

        // Join on date, dropping zero readings on either side
        let points: Vec<(f64, f64)> = xs
            .iter()
            .filter_map(|(date, x)| {
                let y = ys.get(date)?;
                (x > 0.0 && y > 0.0).then_some((x, y * y_scale))
            })
            .collect();
        if points.len() < 2 {
            return Ok(false);
        }

        let x_max = padded_max(points.iter().map(|(x, _)| *x));
        let y_max = padded_max(points.iter().map(|(_, y)| *y));

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(spec.title, (self.font.as_str(), self.font_size))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .build_cartesian_2d(0f64..x_max, 0f64..y_max)
            .map_err(backend)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label)
            .y_desc(spec.y_label)
            .draw()
            .map_err(backend)?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|(x, y)| Circle::new((*x, *y), 4, PALETTE[0].mix(0.7).filled())),
            )
            .map_err(backend)?;

        if let Some((slope, intercept)) = linear_fit(&points) {
            let x_lo = points.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
            let x_hi = points.iter().map(|(x, _)| *x).fold(0.0f64, f64::max);
            let color = PALETTE[1];
            chart
                .draw_series(LineSeries::new(
                    vec![
                        (x_lo, slope * x_lo + intercept),
                        (x_hi, slope * x_hi + intercept),
                    ],
                    color.stroke_width(2),
                ))
                .map_err(backend)?
                .label("Trend")
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
                });
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()
                .map_err(backend)?;
        }

        root.present().map_err(backend)?;
        Ok(true)
    }

    fn draw_dual_axis(
        &self,
        spec: &ChartSpec,
        set: &AggregateSet,
        bars_name: &str,
        line_name: &str,
        y2_label: &str,
        path: &Path,
    ) -> Result<bool, RenderError> {
        let (Some(bars), Some(line)) = (set.get(bars_name), set.get(line_name)) else {
            return Ok(false);
        };
        if bars.len() < 2 || line.len() < 2 {
            return Ok(false);
        }

        let both = [bars, line];
        let Some((start, end)) = date_span(&both) else {
            return Ok(false);
        };
        // Pad half a month so edge bars are not clipped
        let start = start - Duration::days(16);
        let end = end + Duration::days(16);
        let bars_max = padded_max(bars.iter().map(|(_, v)| v));
        let line_max = padded_max(line.iter().map(|(_, v)| v));

        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(backend)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(spec.title, (self.font.as_str(), self.font_size))
            .margin(12)
            .x_label_area_size(48)
            .y_label_area_size(64)
            .right_y_label_area_size(64)
            .build_cartesian_2d(start..end, 0f64..bars_max)
            .map_err(backend)?
            .set_secondary_coord(start..end, 0f64..line_max);

        chart
            .configure_mesh()
            .x_desc(spec.x_label)
            .y_desc(spec.y_label)
            .x_labels(8)
            .x_label_formatter(&|d: &NaiveDate| d.format("%b-%y").to_string())
            .draw()
            .map_err(backend)?;
        chart
            .configure_secondary_axes()
            .y_desc(y2_label)
            .draw()
            .map_err(backend)?;

        let bar_color = PALETTE[0];
        chart
            .draw_series(bars.iter().map(|(date, value)| {
                Rectangle::new(
                    [
                        (date - Duration::days(12), 0.0),
                        (date + Duration::days(12), value),
                    ],
                    bar_color.mix(0.6).filled(),
                )
            }))
            .map_err(backend)?
            .label(legend_label(&bars.name))
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], bar_color.mix(0.6).filled())
            });

        let line_color = PALETTE[1];
        chart
            .draw_secondary_series(LineSeries::new(
                line.iter(),
                line_color.stroke_width(2),
            ))
            .map_err(backend)?
            .label(legend_label(&line.name))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], line_color.stroke_width(2))
            });

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(backend)?;

        root.present().map_err(backend)?;
        Ok(true)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Map any plotters backend error into the shared render error type.
fn backend<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Backend(err.to_string())
}

/// Resolve spec series names against the aggregate set, keeping only series
/// with enough points to draw.
fn drawable_series<'a>(set: &'a AggregateSet, names: &[&str]) -> Vec<&'a Series> {
    names
        .iter()
        .filter_map(|name| set.get(name))
        .filter(|s| s.len() >= 2)
        .collect()
}

/// Legend label: the category part of "Metric/Category" names, otherwise
/// the full series name.
fn legend_label(name: &str) -> &str {
    name.split_once('/').map_or(name, |(_, category)| category)
}

fn date_span(series: &[&Series]) -> Option<(NaiveDate, NaiveDate)> {
    let start = series.iter().filter_map(|s| s.first_date()).min()?;
    let end = series.iter().filter_map(|s| s.last_date()).max()?;
    (start < end).then_some((start, end))
}

/// Upper y-axis bound: 5% headroom over the data, never zero-height.
fn padded_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0f64, f64::max);
    if max > 0.0 {
        max * 1.05
    } else {
        1.0
    }
}

fn union_dates(series: &[&Series]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points.keys().copied())
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

fn segment_index(value: &SegmentValue<usize>) -> Option<usize> {
    match value {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => Some(*i),
        SegmentValue::Last => None,
    }
}

/// File-name slug for a chart title.
fn slug(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut last_underscore = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_underscore = false;
        } else if !last_underscore && !out.is_empty() {
            out.push('_');
            last_underscore = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use minerep_core::Series;

    fn date(month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, month, 1).unwrap()
    }

    fn set_with(name: &str, values: &[(u32, f64)]) -> AggregateSet {
        let mut set = AggregateSet::new();
        set.insert(Series::from_points(
            name,
            values.iter().map(|&(m, v)| (date(m), v)),
        ));
        set
    }

    #[test]
    fn slug_flattens_titles() {
        assert_eq!(slug("Ore Production Over Time"), "ore_production_over_time");
        assert_eq!(slug("Fuel Efficiency"), "fuel_efficiency");
        assert_eq!(slug("Fleet, Fuel & Ore"), "fleet_fuel_ore");
    }

    #[test]
    fn legend_label_strips_metric_prefix() {
        assert_eq!(legend_label("Ore Mined/RGM"), "RGM");
        assert_eq!(legend_label("Total Ore (kt)"), "Total Ore (kt)");
        assert_eq!(legend_label("Ore Mined/RGM (3M MA)"), "RGM (3M MA)");
    }

    #[test]
    fn missing_series_skips_chart_without_touching_disk() {
        let renderer = ChartRenderer::new();
        let set = AggregateSet::new();
        let dir = std::env::temp_dir();

        for spec in catalog() {
            let result = renderer.render_spec(spec, &set, &dir).unwrap();
            assert!(result.is_none(), "{} should skip", spec.title);
        }
    }

    #[test]
    fn one_point_series_is_skipped() {
        let renderer = ChartRenderer::new();
        let set = set_with("Ore Mined/RGM", &[(1, 400.0)]);
        let dir = std::env::temp_dir();

        let spec = catalog()
            .iter()
            .find(|s| s.title == "Ore Production Over Time")
            .unwrap();
        assert!(renderer.render_spec(spec, &set, &dir).unwrap().is_none());
    }

    #[test]
    fn one_slice_pie_is_skipped() {
        let renderer = ChartRenderer::new();
        let set = set_with("Ore Mined/RGM", &[(1, 400.0), (2, 500.0)]);
        let dir = std::env::temp_dir();

        let spec = catalog()
            .iter()
            .find(|s| s.title == "Total Ore Production Share")
            .unwrap();
        assert!(renderer.render_spec(spec, &set, &dir).unwrap().is_none());
    }

    #[test]
    fn date_span_requires_distinct_dates() {
        let series = Series::from_points("s", [(date(1), 1.0)]);
        assert_eq!(date_span(&[&series]), None);

        let longer = Series::from_points("s", [(date(1), 1.0), (date(2), 2.0)]);
        assert_eq!(date_span(&[&longer]), Some((date(1), date(2))));
    }

    #[test]
    fn padded_max_guards_empty_and_zero() {
        assert_eq!(padded_max([]), 1.0);
        assert_eq!(padded_max([0.0]), 1.0);
        assert_eq!(padded_max([100.0]), 105.0);
    }
}
