//! Error types for file ingestion
//!
//! Display strings double as the rejection reasons recorded per file.

use thiserror::Error;

/// Errors that reject an input file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    /// Extension outside the allowed set
    #[error("Unsupported file format")]
    UnsupportedFormat(String),

    #[error("File read error: file size {size} bytes exceeds limit of {max} bytes")]
    TooLarge { size: u64, max: u64 },

    /// Unreadable or malformed content
    #[error("File read error: {0}")]
    Read(String),

    #[error("Cleaning error: {0}")]
    Cleaning(String),

    /// Another input already produced a table with this name
    #[error("Duplicate table name '{0}'")]
    DuplicateTable(String),

    /// Nothing usable left once cleaning and profiling are done
    #[error("No data after cleaning")]
    Empty,
}

/// Result type for ingestion
pub type IngestResult<T> = Result<T, IngestError>;

impl From<std::io::Error> for IngestError {
    fn from(e: std::io::Error) -> Self {
        IngestError::Read(e.to_string())
    }
}

impl From<csv::Error> for IngestError {
    fn from(e: csv::Error) -> Self {
        IngestError::Read(e.to_string())
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(e: serde_json::Error) -> Self {
        IngestError::Read(e.to_string())
    }
}
