//! Result bundle of one inference run

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::{CompositeKeyFallback, RelationshipCandidate};
use crate::overlap::TableOverlap;

/// Everything produced by [`SchemaPipeline::infer`](super::SchemaPipeline::infer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    pub session_id: String,
    /// Generated (or rewritten) DDL
    pub sql: String,
    /// Mermaid ER diagram
    pub diagram: String,
    /// DBML rendering of the same schema
    pub dbml: String,
    /// Human-readable notes about dropped relationships and skipped steps
    pub warnings: Vec<String>,
    pub overlaps: Vec<TableOverlap>,
    /// Filename -> rejection reason
    pub rejected_files: IndexMap<String, String>,
    /// Table -> composite key used in place of a single-column primary key
    pub composite_pk_fallbacks: IndexMap<String, CompositeKeyFallback>,
    /// Names of the tables that were profiled from the input
    pub tables: Vec<String>,
    /// Filenames of every input, accepted or not
    pub filenames: Vec<String>,
    /// Relationship candidates, highest confidence per edge
    pub relationships: Vec<RelationshipCandidate>,
    pub created_at: DateTime<Utc>,
}

impl InferenceResult {
    /// Empty result for a new session
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            sql: String::new(),
            diagram: String::new(),
            dbml: String::new(),
            warnings: Vec::new(),
            overlaps: Vec::new(),
            rejected_files: IndexMap::new(),
            composite_pk_fallbacks: IndexMap::new(),
            tables: Vec::new(),
            filenames: Vec::new(),
            relationships: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// At least one input made it through ingestion
    pub fn has_schema(&self) -> bool {
        !self.tables.is_empty()
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let mut result = InferenceResult::new("abc");
        result
            .rejected_files
            .insert("notes.txt".into(), "Unsupported file format".into());
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["session_id"], "abc");
        assert_eq!(json["rejected_files"]["notes.txt"], "Unsupported file format");
        assert_eq!(json["sql"], "");
        assert!(json["created_at"].is_string());
        assert!(!result.has_schema());
    }
}
