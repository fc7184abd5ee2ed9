//! Report workbook assembly.
//!
//! Builds the output workbook: a Summary sheet, the Processed_Data wide
//! table and one sheet per chart group with the rendered images embedded.
//! The save is atomic from the caller's perspective: bytes are staged in a
//! temporary file next to the destination and renamed over it, so a failed
//! run never leaves a partial workbook behind.

use minerep_core::{ReportError, Summary, TidyTable};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Image, Workbook, XlsxError};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::ChartGroup;
use crate::charts::RenderedChart;

/// Vertical rows reserved per embedded chart image.
const ROWS_PER_CHART: u32 = 32;

/// Report workbook writer.
#[derive(Clone, Debug)]
pub struct ReportWriter {
    /// Title shown on the Summary sheet
    pub report_title: String,
    /// Accent color for headers and titles
    pub accent: u32,
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self {
            report_title: "Mining Production Report".into(),
            accent: 0x36_60_92,
        }
    }
}

struct Formats {
    title: Format,
    header: Format,
    label: Format,
    number: Format,
    month: Format,
}

impl ReportWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the Summary sheet title
    pub fn report_title(mut self, title: impl Into<String>) -> Self {
        self.report_title = title.into();
        self
    }

    fn formats(&self) -> Formats {
        Formats {
            title: Format::new()
                .set_bold()
                .set_font_size(14)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(self.accent)),
            header: Format::new()
                .set_bold()
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(self.accent))
                .set_border(FormatBorder::Thin)
                .set_align(FormatAlign::Center),
            label: Format::new().set_bold(),
            number: Format::new()
                .set_num_format("#,##0.0")
                .set_border(FormatBorder::Thin),
            month: Format::new().set_border(FormatBorder::Thin),
        }
    }

    /// Build the workbook and write it to `path` atomically.
    pub fn write(
        &self,
        table: &TidyTable,
        summary: &Summary,
        charts: &[RenderedChart],
        path: &Path,
    ) -> Result<(), ReportError> {
        if table.is_empty() {
            return Err(ReportError::NoData);
        }
        let formats = self.formats();

        let mut workbook = Workbook::new();
        self.add_summary_sheet(&mut workbook, summary, &formats)
            .map_err(workbook_err)?;
        self.add_data_sheet(&mut workbook, table, &formats)
            .map_err(workbook_err)?;
        self.add_chart_sheets(&mut workbook, charts, &formats)
            .map_err(workbook_err)?;

        let buffer = workbook.save_to_buffer().map_err(workbook_err)?;
        persist_atomically(&buffer, path)?;

        info!(path = %path.display(), bytes = buffer.len(), "report written");
        Ok(())
    }

    fn add_summary_sheet(
        &self,
        workbook: &mut Workbook,
        summary: &Summary,
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        sheet.set_column_width(0, 34)?;
        sheet.set_column_width(1, 18)?;
        sheet.set_column_width(2, 18)?;
        sheet.set_column_width(3, 18)?;

        sheet.merge_range(0, 0, 0, 3, &self.report_title, &formats.title)?;

        let mut row = 2;
        sheet.write_string_with_format(row, 0, "Date Range", &formats.label)?;
        sheet.write_string(row, 1, summary.date_range().unwrap_or_default())?;
        row += 1;
        sheet.write_string_with_format(row, 0, "Months Covered", &formats.label)?;
        sheet.write_number(row, 1, summary.months_covered as f64)?;
        row += 1;
        sheet.write_string_with_format(row, 0, "Missing Cells Filled", &formats.label)?;
        sheet.write_number(row, 1, summary.filled_cells as f64)?;
        row += 2;

        sheet.write_string_with_format(row, 0, "Metric", &formats.header)?;
        sheet.write_string_with_format(row, 1, "Total", &formats.header)?;
        sheet.write_string_with_format(row, 2, "Average / Month", &formats.header)?;
        sheet.write_string_with_format(row, 3, "Max", &formats.header)?;
        row += 1;

        for stat in &summary.metrics {
            sheet.write_string(row, 0, &stat.heading)?;
            sheet.write_number_with_format(row, 1, stat.total, &formats.number)?;
            sheet.write_number_with_format(row, 2, stat.mean, &formats.number)?;
            sheet.write_number_with_format(row, 3, stat.max, &formats.number)?;
            row += 1;
        }
        Ok(())
    }

    fn add_data_sheet(
        &self,
        workbook: &mut Workbook,
        table: &TidyTable,
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        let wide = table.to_wide();

        let sheet = workbook.add_worksheet();
        sheet.set_name("Processed_Data")?;
        sheet.set_column_width(0, 12)?;

        sheet.write_string_with_format(0, 0, "Date", &formats.header)?;
        for (col, key) in wide.columns.iter().enumerate() {
            let col = col as u16 + 1;
            sheet.write_string_with_format(0, col, key.heading(), &formats.header)?;
            sheet.set_column_width(col, 20)?;
        }

        for (r, row) in wide.rows.iter().enumerate() {
            let r = r as u32 + 1;
            sheet.write_string_with_format(
                r,
                0,
                row.date.format("%Y-%m").to_string(),
                &formats.month,
            )?;
            for (col, value) in row.cells.iter().enumerate() {
                sheet.write_number_with_format(r, col as u16 + 1, *value, &formats.number)?;
            }
        }

        sheet.set_freeze_panes(1, 0)?;
        debug!(rows = wide.rows.len(), columns = wide.columns.len(), "data sheet written");
        Ok(())
    }

    /// One sheet per group, in catalog order. Groups whose charts were all
    /// skipped still get their sheet, just with no images.
    fn add_chart_sheets(
        &self,
        workbook: &mut Workbook,
        charts: &[RenderedChart],
        formats: &Formats,
    ) -> Result<(), XlsxError> {
        for group in ChartGroup::ALL {
            let sheet = workbook.add_worksheet();
            sheet.set_name(group.sheet_name())?;
            sheet.set_screen_gridlines(false);
            sheet.write_string_with_format(0, 0, group.sheet_name(), &formats.title)?;

            let mut row = 2;
            for chart in charts.iter().filter(|c| c.group == group) {
                let image = Image::new(&chart.path)?;
                sheet.insert_image(row, 1, &image)?;
                row += ROWS_PER_CHART;
            }
        }
        Ok(())
    }
}

fn workbook_err(err: XlsxError) -> ReportError {
    ReportError::Workbook(err.to_string())
}

/// Stage the workbook bytes in a sibling temporary file, then rename over
/// the destination. Nothing is left at `path` on failure.
fn persist_atomically(buffer: &[u8], path: &Path) -> Result<(), ReportError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir)?;
    staged.write_all(buffer)?;
    staged.flush()?;
    staged.persist(path).map_err(|e| ReportError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use minerep_core::TidyTable;

    #[test]
    fn empty_table_is_rejected() {
        let table = TidyTable::new();
        let summary = Summary::from_table(&table);
        let writer = ReportWriter::new();

        let result = writer.write(&table, &summary, &[], Path::new("unused.xlsx"));
        assert!(matches!(result, Err(ReportError::NoData)));
        assert!(!Path::new("unused.xlsx").exists());
    }

    #[test]
    fn builder_overrides_title() {
        let writer = ReportWriter::new().report_title("Q3 Review");
        assert_eq!(writer.report_title, "Q3 Review");
    }
}
