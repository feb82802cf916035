//! Error types for pipeline operations
//!
//! A run never fails on data: rejected files, dropped relationships and
//! rewrite failures are reported inside the result. These errors only cover
//! configuration problems detected before any stage starts.

use thiserror::Error;

/// Errors that prevent a pipeline run from starting
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Pipeline configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            PipelineError::ConfigError("bad".into()).to_string(),
            "Configuration error: bad"
        );
    }
}
