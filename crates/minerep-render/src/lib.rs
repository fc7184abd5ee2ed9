//! # minerep-render
//!
//! Output side of the minerep pipeline.
//!
//! This crate provides:
//! - The fixed chart catalog: four named groups of chart specifications
//! - PNG chart rendering via plotters, with per-chart failure isolation
//! - Report workbook assembly via rust_xlsxwriter with an atomic save
//!
//! ## Example
//!
//! ```rust,ignore
//! use minerep_render::{ChartRenderer, ReportWriter};
//!
//! let charts = ChartRenderer::new().render_catalog(&aggregates, temp_dir.path());
//! ReportWriter::new().write(&table, &summary, &charts, &output_path)?;
//! ```

pub mod catalog;
pub mod charts;
pub mod excel;

pub use catalog::{catalog, ChartGroup, ChartKind, ChartSpec};
pub use charts::{ChartRenderer, RenderedChart};
pub use excel::ReportWriter;
