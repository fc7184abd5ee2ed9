//! Integration tests for report workbook assembly

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use minerep_core::{Summary, TidyRecord, TidyTable};
use minerep_render::{ChartGroup, ReportWriter};
use tempfile::TempDir;

fn date(month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, month, 1).unwrap()
}

fn sample_table() -> TidyTable {
    let mut table = TidyTable::new();
    for (month, ore, overburden) in [(1, 400.0, 1200.0), (2, 500.0, 1000.0), (3, 450.0, 900.0)] {
        table.push(TidyRecord {
            date: date(month),
            metric: "Ore Mined".into(),
            category: Some("RGM".into()),
            unit: Some("kt".into()),
            value: ore,
        });
        table.push(TidyRecord {
            date: date(month),
            metric: "Overburden".into(),
            category: Some("RGM".into()),
            unit: Some("kt".into()),
            value: overburden,
        });
    }
    table.filled_cells = 2;
    table.sort();
    table
}

#[test]
fn report_contains_all_expected_sheets() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let table = sample_table();
    let summary = Summary::from_table(&table);
    ReportWriter::new().write(&table, &summary, &[], &path).unwrap();

    let workbook = open_workbook_auto(&path).unwrap();
    let names = workbook.sheet_names().to_owned();

    assert_eq!(names[0], "Summary");
    assert_eq!(names[1], "Processed_Data");
    for group in ChartGroup::ALL {
        assert!(
            names.contains(&group.sheet_name().to_string()),
            "missing sheet {:?}",
            group
        );
    }
    assert_eq!(names.len(), 6);
}

#[test]
fn summary_sheet_reports_counts() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let table = sample_table();
    let summary = Summary::from_table(&table);
    ReportWriter::new().write(&table, &summary, &[], &path).unwrap();

    let mut workbook = open_workbook_auto(&path).unwrap();
    let range = workbook.worksheet_range("Summary").unwrap();

    let cells: Vec<(String, Option<f64>)> = range
        .rows()
        .map(|row| {
            let label = row.first().map(ToString::to_string).unwrap_or_default();
            let value = row.get(1).and_then(|c| match c {
                Data::Float(f) => Some(*f),
                Data::Int(i) => Some(*i as f64),
                _ => None,
            });
            (label, value)
        })
        .collect();

    let months = cells.iter().find(|(l, _)| l == "Months Covered").unwrap();
    assert_eq!(months.1, Some(3.0));
    let filled = cells
        .iter()
        .find(|(l, _)| l == "Missing Cells Filled")
        .unwrap();
    assert_eq!(filled.1, Some(2.0));
}

#[test]
fn processed_data_sheet_is_wide() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("report.xlsx");

    let table = sample_table();
    let summary = Summary::from_table(&table);
    ReportWriter::new().write(&table, &summary, &[], &path).unwrap();

    let mut workbook = open_workbook_auto(&path).unwrap();
    let range = workbook.worksheet_range("Processed_Data").unwrap();

    let header: Vec<String> = range.rows().next().unwrap().iter().map(ToString::to_string).collect();
    assert_eq!(
        header,
        vec!["Date", "Ore Mined - RGM - kt", "Overburden - RGM - kt"]
    );

    // 1 header row + 3 months
    assert_eq!(range.rows().count(), 4);
    let first = range.rows().nth(1).unwrap();
    assert_eq!(first[0].to_string(), "2020-01");
    assert_eq!(first[1], Data::Float(400.0));
}

#[test]
fn failed_save_leaves_no_partial_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing_subdir").join("report.xlsx");

    let table = sample_table();
    let summary = Summary::from_table(&table);
    let result = ReportWriter::new().write(&table, &summary, &[], &path);

    assert!(result.is_err());
    assert!(!path.exists());
}
