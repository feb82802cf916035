//! Error types for value matching

use thiserror::Error;

/// Errors from a single column pair comparison. They are logged and the
/// pair contributes no matches.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("No data for column {table}.{column}")]
    MissingColumn { table: String, column: String },

    #[error("Comparison of {source_column} with {target_column} panicked: {message}")]
    WorkerPanicked {
        source_column: String,
        target_column: String,
        message: String,
    },
}

/// Result type for matching operations
pub type MatchResult<T> = Result<T, MatchError>;
