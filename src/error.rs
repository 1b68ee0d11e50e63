use std::path::PathBuf;

use thiserror::Error;

// errors which stop a run
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing columns in header: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("unsupported input format: {0} (export the sheet as CSV)")]
    UnsupportedFormat(String),

    #[error("amount limit exceeded while summing {0}")]
    Overflow(&'static str),

    #[error("invalid week: {0}")]
    InvalidWeek(String),
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

// errors which drop a single row, processing continues
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RowError {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("unparseable date: {0:?}")]
    Date(String),

    #[error("invalid quantity: {0:?}")]
    Quantity(String),

    #[error("invalid unit_price: {0:?}")]
    Price(String),

    #[error("line revenue exceeds limit")]
    RevenueOverflow,

    #[error("malformed row: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
