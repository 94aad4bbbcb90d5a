//! Tabular data handling for tablechat
//!
//! Uploads are dispatched on their MIME type to a CSV or XLSX reader and
//! turned into an in-memory [`Dataset`]. The dataset is only ever read:
//! for the preview, for chart axis selection, and as context for the agent.

pub mod chart;
pub mod csv;
pub mod dataset;
pub mod upload;
pub mod xlsx;

use thiserror::Error;

pub use chart::{ChartKind, ChartRequest, ChartSpec};
pub use dataset::{CellValue, Dataset};
pub use upload::{load_upload, load_upload_with, SheetParser, SpreadsheetReader, UploadKind, CSV_MIME, XLSX_MIME};

/// Errors surfaced to the user while loading or inspecting a dataset
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("Failed to read CSV: {0}")]
    Csv(String),

    #[error("Failed to read XLSX: {0}")]
    Xlsx(String),

    #[error("The uploaded file is empty")]
    Empty,

    #[error("The column '{column}' does not exist. Available columns are: {available:?}")]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Failed to export table: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, DataError>;
