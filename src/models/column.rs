//! Column profile model

use serde::{Deserialize, Serialize};

use super::sql_type::SqlType;

/// Statistical and semantic profile of one column of an ingested table.
///
/// # Example
///
/// ```rust
/// use schema_inference_sdk::models::{ColumnProfile, SqlType};
///
/// let column = ColumnProfile::new("id", SqlType::Int, 1.0, 0.0, vec!["1".into(), "2".into()]);
/// assert!(column.is_fully_unique());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnProfile {
    /// Column name (sanitized, unique within its table)
    pub name: String,
    /// Inferred SQL type tag
    pub detected_type: SqlType,
    /// Distinct non-null values over non-null count, in [0, 1]
    pub unique_ratio: f64,
    /// Share of missing cells over all rows, in [0, 1]
    pub null_percent: f64,
    /// Small deterministic sample of stringified non-null values
    #[serde(default)]
    pub sample_values: Vec<String>,
    #[serde(default)]
    pub is_primary_key: bool,
    /// `"table.column"` reference when this column is a foreign key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_foreign_key_to: Option<String>,
    /// Suggested name from entity clustering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
    /// Detected value format such as `email` or `uuid`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
}

impl ColumnProfile {
    /// Create a new profile; ratios are clamped into [0, 1].
    pub fn new(
        name: impl Into<String>,
        detected_type: SqlType,
        unique_ratio: f64,
        null_percent: f64,
        sample_values: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            detected_type,
            unique_ratio: unique_ratio.clamp(0.0, 1.0),
            null_percent: null_percent.clamp(0.0, 1.0),
            sample_values,
            is_primary_key: false,
            is_foreign_key_to: None,
            canonical_name: None,
            semantic_type: None,
        }
    }

    pub fn with_semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.semantic_type = Some(semantic_type.into());
        self
    }

    /// Every non-null value is distinct and nothing is missing.
    pub fn is_fully_unique(&self) -> bool {
        self.unique_ratio >= 1.0 && self.null_percent <= 0.0
    }

    /// Nullable when more than `threshold` of rows are missing.
    pub fn is_nullable(&self, threshold: f64) -> bool {
        self.null_percent > threshold
    }
}
