//! Relationship candidate model

use std::fmt;

use serde::{Deserialize, Serialize};

/// How a relationship candidate was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Inferred,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchType::Exact => write!(f, "exact"),
            MatchType::Fuzzy => write!(f, "fuzzy"),
            MatchType::Inferred => write!(f, "inferred"),
        }
    }
}

/// A suggested foreign key from `source_table.source_column` to
/// `target_table.target_column`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelationshipCandidate {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub match_type: MatchType,
    /// Machine-readable rule name, e.g. `direct_match`
    pub reason: String,
}

impl RelationshipCandidate {
    pub fn new(
        source: (&str, &str),
        target: (&str, &str),
        confidence: f64,
        match_type: MatchType,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            source_table: source.0.to_string(),
            source_column: source.1.to_string(),
            target_table: target.0.to_string(),
            target_column: target.1.to_string(),
            confidence: confidence.clamp(0.0, 1.0),
            match_type,
            reason: reason.into(),
        }
    }

    /// Identity of the edge, ignoring how it was found.
    pub fn edge(&self) -> (&str, &str, &str, &str) {
        (
            &self.source_table,
            &self.source_column,
            &self.target_table,
            &self.target_column,
        )
    }
}
