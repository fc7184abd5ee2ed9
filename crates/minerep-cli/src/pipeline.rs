//! The report pipeline.
//!
//! One linear run: load -> aggregate -> render charts -> write report. The
//! entry points (CLI arguments, interactive prompt) are thin adapters over
//! [`run`]. Data-quality issues are recovered inside the stages; only
//! whole-file problems bubble up here and abort the run before anything is
//! written.

use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use minerep_core::Summary;
use minerep_metrics::aggregate;
use minerep_parser::load_table;
use minerep_render::{ChartRenderer, ReportWriter};

/// Ask for an input path on stdin. A blank response aborts the run.
pub fn prompt_for_input() -> Result<PathBuf> {
    print!("Enter spreadsheet path: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        bail!("no input file specified");
    }
    Ok(PathBuf::from(trimmed))
}

/// Output path beside the input: `<stem>_with_charts.xlsx`.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "report".to_string(), |s| s.to_string_lossy().into_owned());
    input.with_file_name(format!("{stem}_with_charts.xlsx"))
}

/// Run the full pipeline and return the written report path.
pub fn run(input: &Path, sheet: Option<&str>, output: Option<&Path>) -> Result<PathBuf> {
    info!(input = %input.display(), "loading spreadsheet");
    let table = load_table(input, sheet)
        .with_context(|| format!("failed to load '{}'", input.display()))?;
    info!(
        records = table.len(),
        months = table.months_covered(),
        filled = table.filled_cells,
        "data normalized"
    );

    let aggregates = aggregate(&table);
    let summary = Summary::from_table(&table);

    let chart_dir = tempfile::tempdir().context("failed to create chart directory")?;
    let charts = ChartRenderer::new().render_catalog(&aggregates, chart_dir.path());
    info!(charts = charts.len(), "charts rendered");

    let output = output.map_or_else(|| default_output_path(input), Path::to_path_buf);
    ReportWriter::new()
        .write(&table, &summary, &charts, &output)
        .with_context(|| format!("failed to write report '{}'", output.display()))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_output_is_suffixed_sibling() {
        let out = default_output_path(Path::new("/data/produccion_2022.xlsx"));
        assert_eq!(out, Path::new("/data/produccion_2022_with_charts.xlsx"));
    }

    #[test]
    fn default_output_for_extensionless_input() {
        let out = default_output_path(Path::new("produccion"));
        assert_eq!(out, Path::new("produccion_with_charts.xlsx"));
    }
}
