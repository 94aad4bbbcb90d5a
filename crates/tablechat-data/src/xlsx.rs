// Excel (xlsx) import
//
// Only the first worksheet is read. Its first row is the header.

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use chrono::Timelike;

use crate::dataset::{CellValue, Dataset};
use crate::{DataError, Result};

pub fn parse(bytes: &[u8]) -> Result<Dataset> {
    let mut workbook = open_workbook_from_rs::<Xlsx<_>, _>(Cursor::new(bytes))
        .map_err(|e| DataError::Xlsx(e.to_string()))?;

    let sheet_name = workbook.sheet_names().first().cloned();
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DataError::Empty)?
        .map_err(|e| DataError::Xlsx(e.to_string()))?;

    let mut rows = range.rows();
    let header: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(|c| convert(c).to_string()).collect(),
        None => return Err(DataError::Empty),
    };

    let data: Vec<Vec<CellValue>> = rows
        .map(|cells| cells.iter().map(convert).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(CellValue::is_empty))
        .collect();

    log::debug!(
        "Parsed worksheet {:?} with {} columns and {} rows",
        sheet_name,
        header.len(),
        data.len()
    );
    Ok(Dataset::new(header, data))
}

fn convert(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::infer(s),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) if value.num_seconds_from_midnight() == 0 && value.nanosecond() == 0 => {
                CellValue::Text(value.format("%Y-%m-%d").to_string())
            }
            Some(value) => CellValue::Text(value.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::Workbook;

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "region").unwrap();
        sheet.write_string(0, 1, "units").unwrap();
        sheet.write_string(1, 0, "north").unwrap();
        sheet.write_number(1, 1, 12.0).unwrap();
        sheet.write_string(2, 0, "south").unwrap();
        sheet.write_number(2, 1, 7.5).unwrap();
        sheet.write_boolean(3, 0, true).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_parse_first_sheet() {
        let ds = parse(&workbook_bytes()).unwrap();
        assert_eq!(ds.columns(), &["region", "units"]);
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.rows()[0], vec![CellValue::Text("north".into()), CellValue::Number(12.0)]);
        assert_eq!(ds.rows()[1][1], CellValue::Number(7.5));
        assert_eq!(ds.rows()[2], vec![CellValue::Bool(true), CellValue::Empty]);
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        let err = parse(b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, DataError::Xlsx(_)));
    }
}
