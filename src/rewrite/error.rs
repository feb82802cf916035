//! Error types for schema rewriting
//!
//! Every variant is recoverable: the pipeline keeps the original DDL and
//! records the error text as a warning.

use thiserror::Error;

/// Errors that can occur while rewriting DDL
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewriteError {
    /// Failed to connect to the rewriting service
    #[error("Failed to connect to rewriting service: {0}")]
    ConnectionError(String),

    /// Request timeout
    #[error("Rewrite request timed out after {0} seconds")]
    Timeout(u64),

    /// Response could not be read
    #[error("Invalid rewrite response: {0}")]
    InvalidResponse(String),

    /// The response held no DDL between the expected markers
    #[error("No DDL found in rewrite response")]
    MissingDdl,

    /// The extracted DDL does not parse
    #[error("Rewritten DDL failed validation: {0}")]
    ValidationError(String),

    /// Dialect has no prompt requirements
    #[error("Unsupported dialect for rewriting: {0}")]
    UnsupportedDialect(String),

    /// Rewriting was requested but no rewriter is configured
    #[error("Rewriting requested but no rewriter is configured")]
    NotConfigured,
}

impl From<serde_json::Error> for RewriteError {
    fn from(err: serde_json::Error) -> Self {
        RewriteError::InvalidResponse(err.to_string())
    }
}

/// Result type for rewrite operations
pub type RewriteResult<T> = Result<T, RewriteError>;
