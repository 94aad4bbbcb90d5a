// CSV import

use crate::dataset::{CellValue, Dataset};
use crate::{DataError, Result};

/// Parse uploaded CSV bytes. The first record is the header row.
pub fn parse(bytes: &[u8]) -> Result<Dataset> {
    let content = decode_to_utf8(bytes);
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(record) => record
            .map_err(|e| DataError::Csv(e.to_string()))?
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>(),
        None => return Err(DataError::Empty),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| DataError::Csv(e.to_string()))?;
        // Skip blank lines
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(CellValue::infer).collect());
    }

    log::debug!("Parsed CSV with {} columns and {} rows", header.len(), rows.len());
    Ok(Dataset::new(header, rows))
}

/// Convert bytes to UTF-8, falling back to Windows-1252 (common for
/// Excel-exported CSVs).
pub fn decode_to_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_header_and_typed_rows() {
        let ds = parse(b"name,age,member\nAda,36,true\nLin,,false\n").unwrap();
        assert_eq!(ds.columns(), &["name", "age", "member"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(
            ds.rows()[0],
            vec![CellValue::Text("Ada".into()), CellValue::Number(36.0), CellValue::Bool(true)]
        );
        assert_eq!(ds.rows()[1][1], CellValue::Empty);
    }

    #[test]
    fn test_parse_ragged_rows_and_blank_lines() {
        let ds = parse(b"a,b\n1\n\n2,3,4\n").unwrap();
        assert_eq!(ds.columns(), &["a", "b", "Unnamed: 2"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows()[0], vec![CellValue::Number(1.0), CellValue::Empty, CellValue::Empty]);
    }

    #[test]
    fn test_parse_strips_bom_and_handles_latin1() {
        let ds = parse("\u{feff}col\nx\n".as_bytes()).unwrap();
        assert_eq!(ds.columns(), &["col"]);

        // "café" encoded as Windows-1252
        let ds = parse(b"word\ncaf\xe9\n").unwrap();
        assert_eq!(ds.rows()[0][0], CellValue::Text("café".into()));
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(matches!(parse(b""), Err(DataError::Empty)));
    }

    #[test]
    fn test_parse_quoted_fields() {
        let ds = parse(b"title,notes\n\"Hello, world\",\"say \"\"hi\"\"\"\n").unwrap();
        assert_eq!(ds.rows()[0][0], CellValue::Text("Hello, world".into()));
        assert_eq!(ds.rows()[0][1], CellValue::Text("say \"hi\"".into()));
    }
}
