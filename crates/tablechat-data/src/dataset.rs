use serde::Serialize;
use std::fmt;

use crate::{DataError, Result};

/// Placeholder tokens treated as missing values when reading text cells
const MISSING_MARKERS: &[&str] = &["na", "n/a", "nan", "null", "none", "#n/a"];

/// A single cell of an uploaded table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Infer a typed value from raw text (CSV fields, XLSX header cells).
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        let lower = trimmed.to_ascii_lowercase();
        if MISSING_MARKERS.contains(&lower.as_str()) {
            return CellValue::Empty;
        }

        match lower.as_str() {
            "true" => return CellValue::Bool(true),
            "false" => return CellValue::Bool(false),
            _ => {}
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Empty => serde_json::Value::Null,
            CellValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            // Integers without decimals
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// In-memory table loaded from an upload.
///
/// Every row has exactly one cell per column and column names are unique.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset from a header row and data rows.
    ///
    /// Blank header cells become `Unnamed: <index>`, repeated names get a
    /// `.1`, `.2` suffix, and rows are padded (or the header widened) so the
    /// table is rectangular.
    pub fn new(header: Vec<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows
            .iter()
            .map(|r| r.len())
            .max()
            .unwrap_or(0)
            .max(header.len());

        let mut raw_names = header;
        raw_names.resize(width, String::new());

        let mut columns: Vec<String> = Vec::with_capacity(width);
        for (idx, name) in raw_names.into_iter().enumerate() {
            let base = match name.trim() {
                "" => format!("Unnamed: {}", idx),
                trimmed => trimmed.to_string(),
            };
            let mut candidate = base.clone();
            let mut suffix = 1;
            while columns.contains(&candidate) {
                candidate = format!("{}.{}", base, suffix);
                suffix += 1;
            }
            columns.push(candidate);
        }

        for row in rows.iter_mut() {
            row.resize(width, CellValue::Empty);
        }

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// First `n` rows, for the data preview.
    pub fn head(&self, n: usize) -> &[Vec<CellValue>] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Position of a column, or an error naming the columns that do exist.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| DataError::UnknownColumn {
                column: name.to_string(),
                available: self.columns.clone(),
            })
    }

    pub fn column_values(&self, name: &str) -> Result<Vec<&CellValue>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// True when every non-empty cell of the column is a number and at
    /// least one such cell exists.
    pub fn is_numeric(&self, name: &str) -> Result<bool> {
        let values = self.column_values(name)?;
        let mut seen = false;
        for value in values {
            match value {
                CellValue::Empty => {}
                CellValue::Number(_) => seen = true,
                _ => return Ok(false),
            }
        }
        Ok(seen)
    }

    /// Render the header and up to `max_rows` rows as CSV text.
    pub fn to_csv(&self, max_rows: usize) -> Result<String> {
        let mut writer = ::csv::WriterBuilder::new()
            .terminator(::csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(&self.columns)
            .map_err(|e| DataError::Export(e.to_string()))?;
        for row in self.rows.iter().take(max_rows) {
            writer
                .write_record(row.iter().map(|c| c.to_string()))
                .map_err(|e| DataError::Export(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| DataError::Export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| DataError::Export(e.to_string()))
    }
}
