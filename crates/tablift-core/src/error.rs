use std::path::PathBuf;

use crate::model::Strategy;

#[derive(Debug, thiserror::Error)]
pub enum TabliftError {
    #[error("invalid page range '{selector}': {reason}")]
    PageRange { selector: String, reason: String },

    #[error("{strategy} is not available in this environment")]
    StrategyUnavailable { strategy: Strategy },

    #[error("{strategy} error: {message}")]
    Strategy { strategy: Strategy, message: String },

    #[error("table grid could not be converted: {0}")]
    MalformedGrid(String),

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("No tables found or extraction failed. Errors: {}", .errors.join(" | "))]
    NoTablesFound { errors: Vec<String> },

    #[error("failed to write workbook to {path}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("failed to read workbook {path}: {reason}")]
    WorkbookRead { path: PathBuf, reason: String },

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("unknown extraction method '{0}' (expected auto, camelot, tabula or pdfplumber)")]
    UnknownMethod(String),

    #[error("unknown grid flavor '{0}' (expected lattice or stream)")]
    UnknownFlavor(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TabliftError {
    pub(crate) fn strategy(strategy: Strategy, message: impl Into<String>) -> Self {
        TabliftError::Strategy {
            strategy,
            message: message.into(),
        }
    }
}
