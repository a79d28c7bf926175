//! Error and warning taxonomy for ingestion.
//!
//! Structural failures are [`IngestError`] values. Per-field problems never
//! abort a batch; they are accumulated as [`Warning`]s and the field becomes
//! null.

use serde::Serialize;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("source contains no rows")]
    EmptySource,
    #[error("required column not found: {field}")]
    Schema { field: &'static str },
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

impl IngestError {
    /// Wraps any displayable failure at the source boundary.
    pub fn unavailable(err: impl fmt::Display) -> Self {
        IngestError::SourceUnavailable(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    EmptySource,
    Schema,
    Parse,
}

/// A recoverable problem found while normalizing a table.
///
/// `row` is the zero-based index of the data row (header excluded).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub row: Option<usize>,
    pub column: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn parse(row: usize, column: &str, message: impl Into<String>) -> Self {
        Warning {
            kind: WarningKind::Parse,
            row: Some(row),
            column: Some(column.to_string()),
            message: message.into(),
        }
    }

    /// Converts a structural failure into the warning that replaces it.
    pub fn from_error(err: &IngestError) -> Self {
        let kind = match err {
            IngestError::EmptySource => WarningKind::EmptySource,
            _ => WarningKind::Schema,
        };
        let column = match err {
            IngestError::Schema { field } => Some((*field).to_string()),
            _ => None,
        };
        Warning {
            kind,
            row: None,
            column,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.row, self.column.as_deref()) {
            (Some(row), Some(col)) => write!(f, "row {row}, column '{col}': {}", self.message),
            (None, Some(col)) => write!(f, "column '{col}': {}", self.message),
            (Some(row), None) => write!(f, "row {row}: {}", self.message),
            (None, None) => f.write_str(&self.message),
        }
    }
}
