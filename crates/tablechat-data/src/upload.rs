use crate::dataset::Dataset;
use crate::{DataError, Result};

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Csv,
    Xlsx,
}

impl UploadKind {
    /// Pick the reader for a MIME type. Parameters such as `; charset=utf-8`
    /// are ignored; anything other than CSV or XLSX is rejected.
    pub fn from_mime(mime: &str) -> Result<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            CSV_MIME => Ok(Self::Csv),
            XLSX_MIME => Ok(Self::Xlsx),
            _ => Err(DataError::UnsupportedType(mime.to_string())),
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME,
            Self::Xlsx => XLSX_MIME,
        }
    }
}

/// Reader for the supported spreadsheet formats
pub trait SheetParser {
    fn parse_csv(&self, bytes: &[u8]) -> Result<Dataset>;
    fn parse_xlsx(&self, bytes: &[u8]) -> Result<Dataset>;
}

/// Default reader backed by the `csv` and `calamine` crates
#[derive(Debug, Default, Clone, Copy)]
pub struct SpreadsheetReader;

impl SheetParser for SpreadsheetReader {
    fn parse_csv(&self, bytes: &[u8]) -> Result<Dataset> {
        crate::csv::parse(bytes)
    }

    fn parse_xlsx(&self, bytes: &[u8]) -> Result<Dataset> {
        crate::xlsx::parse(bytes)
    }
}

/// Load an uploaded file with the default reader.
pub fn load_upload(mime: &str, bytes: &[u8]) -> Result<Dataset> {
    load_upload_with(&SpreadsheetReader, mime, bytes)
}

/// Dispatch on the MIME type before touching the bytes, so an unsupported
/// upload never reaches a parser.
pub fn load_upload_with<P: SheetParser + ?Sized>(parser: &P, mime: &str, bytes: &[u8]) -> Result<Dataset> {
    let dataset = match UploadKind::from_mime(mime)? {
        UploadKind::Csv => parser.parse_csv(bytes)?,
        UploadKind::Xlsx => parser.parse_xlsx(bytes)?,
    };

    if dataset.column_count() == 0 {
        return Err(DataError::Empty);
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingParser {
        calls: Cell<usize>,
    }

    impl SheetParser for CountingParser {
        fn parse_csv(&self, _bytes: &[u8]) -> Result<Dataset> {
            self.calls.set(self.calls.get() + 1);
            Ok(Dataset::new(vec!["csv".into()], vec![]))
        }

        fn parse_xlsx(&self, _bytes: &[u8]) -> Result<Dataset> {
            self.calls.set(self.calls.get() + 1);
            Ok(Dataset::new(vec!["xlsx".into()], vec![]))
        }
    }

    #[test]
    fn test_from_mime() {
        assert_eq!(UploadKind::from_mime("text/csv").unwrap(), UploadKind::Csv);
        assert_eq!(UploadKind::from_mime("Text/CSV; charset=utf-8").unwrap(), UploadKind::Csv);
        assert_eq!(UploadKind::from_mime(XLSX_MIME).unwrap(), UploadKind::Xlsx);
        assert!(UploadKind::from_mime("application/vnd.ms-excel").is_err());
        assert!(UploadKind::from_mime("").is_err());
    }

    #[test]
    fn test_dispatch_selects_parser() {
        let parser = CountingParser::default();
        let ds = load_upload_with(&parser, CSV_MIME, b"").unwrap();
        assert_eq!(ds.columns(), &["csv"]);
        let ds = load_upload_with(&parser, XLSX_MIME, b"").unwrap();
        assert_eq!(ds.columns(), &["xlsx"]);
        assert_eq!(parser.calls.get(), 2);
    }

    #[test]
    fn test_unsupported_type_never_calls_parser() {
        let parser = CountingParser::default();
        for mime in ["application/json", "image/png", "text/plain", "application/pdf"] {
            let err = load_upload_with(&parser, mime, b"a,b\n1,2\n").unwrap_err();
            assert_eq!(err.to_string(), format!("Unsupported file type: {}", mime));
        }
        assert_eq!(parser.calls.get(), 0);
    }

    #[test]
    fn test_load_upload_csv() {
        let ds = load_upload(CSV_MIME, b"x,y\n1,2\n3,4\n").unwrap();
        assert_eq!(ds.row_count(), 2);
    }
}
