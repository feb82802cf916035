//! Configuration for entity grouping and canonical naming

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Configuration for [`EntityGrouper`](super::EntityGrouper)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroupingConfig {
    /// Minimum match similarity for an edge between two columns (0.0 - 1.0)
    pub threshold: f64,
    /// Coalesce components that still share a column after traversal
    pub merge_overlap: bool,
    /// Groups with fewer columns are discarded
    pub min_group_size: usize,
    /// Tokens ignored when deriving a canonical name
    pub stop_tokens: BTreeSet<String>,
    /// Tokens preferred as canonical name when common to the group
    pub priority_tokens: BTreeSet<String>,
    /// Share of group members a token must appear in to count as common
    pub min_common_ratio: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.85,
            merge_overlap: true,
            min_group_size: 2,
            stop_tokens: ["id", "code", "ref", "fk"]
                .into_iter()
                .map(String::from)
                .collect(),
            priority_tokens: BTreeSet::from(["name".to_string()]),
            min_common_ratio: 0.5,
        }
    }
}

impl GroupingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_merge_overlap(mut self, merge: bool) -> Self {
        self.merge_overlap = merge;
        self
    }

    pub fn with_min_group_size(mut self, size: usize) -> Self {
        self.min_group_size = size.max(1);
        self
    }

    pub fn with_priority_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.priority_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_common_ratio(mut self, ratio: f64) -> Self {
        self.min_common_ratio = ratio.clamp(0.0, 1.0);
        self
    }
}
