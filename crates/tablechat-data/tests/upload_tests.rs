use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;

use tablechat_data::{load_upload, CellValue, ChartKind, ChartRequest, DataError, CSV_MIME};

fn fixture(name: &str) -> Vec<u8> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    fs::read(path).unwrap()
}

#[test]
fn test_sales_fixture_loads_with_missing_values() {
    let ds = load_upload(CSV_MIME, &fixture("sales.csv")).unwrap();

    assert_eq!(ds.columns(), &["month", "revenue", "region"]);
    // blank line skipped
    assert_eq!(ds.row_count(), 4);
    assert_eq!(ds.rows()[1][1], CellValue::Empty);
    assert_eq!(ds.rows()[3][2], CellValue::Empty);
    assert!(ds.is_numeric("revenue").unwrap());
    assert!(!ds.is_numeric("region").unwrap());
}

#[test]
fn test_chart_from_fixture_skips_incomplete_rows() {
    let ds = load_upload("text/csv; charset=utf-8", &fixture("sales.csv")).unwrap();
    let chart = ChartRequest::new(ChartKind::Bar, "month", "revenue").build(&ds).unwrap();

    assert_eq!(chart.points, 3);
    assert_eq!(chart.spec["encoding"]["x"]["type"], "nominal");
    assert_eq!(chart.spec["encoding"]["y"]["type"], "quantitative");
    assert_eq!(chart.spec["data"]["values"][1]["month"], "Mar");
}

#[test]
fn test_unknown_column_lists_available_columns() {
    let ds = load_upload(CSV_MIME, &fixture("sales.csv")).unwrap();
    let err = ChartRequest::new(ChartKind::Line, "month", "profit").build(&ds).unwrap_err();

    assert_eq!(
        err.to_string(),
        r#"The column 'profit' does not exist. Available columns are: ["month", "revenue", "region"]"#
    );
}

#[test]
fn test_spreadsheet_mime_must_match() {
    let err = load_upload("application/vnd.ms-excel", &fixture("sales.csv")).unwrap_err();
    assert!(matches!(err, DataError::UnsupportedType(ref m) if m == "application/vnd.ms-excel"));
}
