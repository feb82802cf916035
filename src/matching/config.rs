//! Configuration for cross-table value matching

use serde::{Deserialize, Serialize};

/// Configuration for [`FuzzyValueMatcher`](super::FuzzyValueMatcher)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FuzzyConfig {
    /// Minimum partial-ratio similarity for column pair matching (0.0 - 1.0)
    pub pair_cutoff: f64,
    /// Minimum similarity for single-value lookups (0.0 - 1.0)
    pub generic_cutoff: f64,
    /// Worker threads used for column pair comparisons
    pub max_workers: usize,
    /// Normalized columns kept in the cache
    pub cache_capacity: usize,
    /// Independent cache partitions
    pub cache_shards: usize,
    /// Source values compared per pair; larger columns are downsampled
    pub source_sample_limit: usize,
    /// Pairs whose target column is longer than this are skipped
    pub target_value_limit: usize,
    /// Only columns with a unique_ratio below this are compared (0.0 - 1.0)
    pub cardinality_ceiling: f64,
}

impl Default for FuzzyConfig {
    fn default() -> Self {
        Self {
            pair_cutoff: 0.75,
            generic_cutoff: 0.90,
            max_workers: 4,
            cache_capacity: 10_000,
            cache_shards: 8,
            source_sample_limit: 500,
            target_value_limit: 1000,
            cardinality_ceiling: 0.8,
        }
    }
}

impl FuzzyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pair_cutoff(mut self, cutoff: f64) -> Self {
        self.pair_cutoff = cutoff.clamp(0.0, 1.0);
        self
    }

    pub fn with_generic_cutoff(mut self, cutoff: f64) -> Self {
        self.generic_cutoff = cutoff.clamp(0.0, 1.0);
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers.max(1);
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.max(1);
        self
    }

    pub fn with_cardinality_ceiling(mut self, ceiling: f64) -> Self {
        self.cardinality_ceiling = ceiling.clamp(0.0, 1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_clamping() {
        let config = FuzzyConfig::default();
        assert_eq!(config.pair_cutoff, 0.75);
        assert_eq!(config.generic_cutoff, 0.90);
        assert_eq!(config.source_sample_limit, 500);
        assert_eq!(config.target_value_limit, 1000);

        let config = FuzzyConfig::new().with_pair_cutoff(75.0).with_max_workers(0);
        assert_eq!(config.pair_cutoff, 1.0);
        assert_eq!(config.max_workers, 1);
    }
}
