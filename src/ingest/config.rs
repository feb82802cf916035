//! Configuration for ingestion and profiling

use serde::{Deserialize, Serialize};

/// Configuration for reading, cleaning and profiling input files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IngestConfig {
    /// Accepted file extensions, lowercase without the dot
    pub allowed_extensions: Vec<String>,
    /// Maximum file size in bytes
    pub max_file_size: u64,
    /// Values sampled per column for type inference
    pub sample_size: usize,
    /// Cell values treated as absent (exact match after trimming)
    pub null_tokens: Vec<String>,
    /// Columns with a larger absent share than this are dropped (0.0 - 1.0)
    pub sparse_column_ratio: f64,
    /// Columns with a larger absent share than this are nullable (0.0 - 1.0)
    pub nullable_threshold: f64,
    /// Enable semantic format detection (email, uuid, ...)
    pub detect_formats: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["csv".to_string(), "json".to_string()],
            max_file_size: 100 * 1024 * 1024,
            sample_size: 5,
            null_tokens: ["", "nan", "NA", "N/A", "null"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sparse_column_ratio: 0.95,
            nullable_threshold: 0.01,
            detect_formats: true,
        }
    }
}

impl IngestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_sample_size(mut self, size: usize) -> Self {
        self.sample_size = size.max(1);
        self
    }

    pub fn with_sparse_column_ratio(mut self, ratio: f64) -> Self {
        self.sparse_column_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_nullable_threshold(mut self, ratio: f64) -> Self {
        self.nullable_threshold = ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_detect_formats(mut self, detect: bool) -> Self {
        self.detect_formats = detect;
        self
    }

    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.allowed_extensions.iter().any(|a| *a == ext)
    }

    pub fn is_null_token(&self, value: &str) -> bool {
        self.null_tokens.iter().any(|t| t == value)
    }
}
