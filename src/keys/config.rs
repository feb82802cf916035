//! Configuration for key detection and relationship suggestion

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Heuristic constants used by [`RelationshipSuggester`](super::RelationshipSuggester)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeyConfig {
    /// Ranked PK type set: full type tag -> priority
    pub type_priority: BTreeMap<String, f64>,
    /// Priority for types missing from `type_priority`
    pub default_type_priority: f64,
    /// Weight of the type priority in the PK score
    pub type_weight: f64,
    /// Weight of the name-pattern score in the PK score
    pub name_weight: f64,
    /// Minimum PK score for a column to qualify
    pub min_pk_score: f64,
    /// Exclusive lower bound on unique_ratio for FK-shaped columns
    pub fk_min_unique_ratio: f64,
    /// Exclusive upper bound on unique_ratio for FK-shaped columns
    pub fk_max_unique_ratio: f64,
    /// Exclusive ceiling on null_percent for FK-shaped columns
    pub fk_max_null_percent: f64,
    /// Sample values compared when fingerprinting alias columns
    pub fingerprint_size: usize,
    pub user_alias_confidence: f64,
    pub detected_alias_confidence: f64,
    pub direct_match_confidence: f64,
    pub name_and_type_confidence: f64,
    /// Used when no PK pattern is discovered
    pub default_pk_patterns: BTreeSet<String>,
    /// Used when no FK pattern is discovered
    pub default_fk_patterns: BTreeSet<String>,
    /// User-confirmed aliases: base name -> alias names
    pub user_aliases: BTreeMap<String, BTreeSet<String>>,
    /// Built-in alias vocabulary, reported through
    /// [`RelationshipSuggester::active_aliases`](super::RelationshipSuggester::active_aliases)
    /// but not used for matching
    pub builtin_aliases: BTreeMap<String, BTreeSet<String>>,
}

fn set_of(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for KeyConfig {
    fn default() -> Self {
        let type_priority = [
            ("INT", 100.0),
            ("BIGINT", 95.0),
            ("UUID", 90.0),
            ("VARCHAR", 70.0),
            ("CHAR", 65.0),
            ("TEXT", 60.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        let builtin_aliases = [
            ("user", set_of(&["client", "customer"])),
            ("product", set_of(&["item", "sku"])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            type_priority,
            default_type_priority: 50.0,
            type_weight: 0.6,
            name_weight: 0.4,
            min_pk_score: 50.0,
            fk_min_unique_ratio: 0.3,
            fk_max_unique_ratio: 0.95,
            fk_max_null_percent: 0.2,
            fingerprint_size: 100,
            user_alias_confidence: 0.95,
            detected_alias_confidence: 0.80,
            direct_match_confidence: 0.97,
            name_and_type_confidence: 0.88,
            default_pk_patterns: set_of(&["id", "pk", "key", "uid", "code"]),
            default_fk_patterns: set_of(&["_id", "_fk", "_ref", "_code"]),
            user_aliases: BTreeMap::new(),
            builtin_aliases,
        }
    }
}

impl KeyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type/name weights of the PK score
    pub fn with_weights(mut self, type_weight: f64, name_weight: f64) -> Self {
        self.type_weight = type_weight.clamp(0.0, 1.0);
        self.name_weight = name_weight.clamp(0.0, 1.0);
        self
    }

    pub fn with_min_pk_score(mut self, score: f64) -> Self {
        self.min_pk_score = score.max(0.0);
        self
    }

    /// Set the exclusive unique_ratio range for FK-shaped columns
    pub fn with_fk_unique_range(mut self, min: f64, max: f64) -> Self {
        self.fk_min_unique_ratio = min.clamp(0.0, 1.0);
        self.fk_max_unique_ratio = max.clamp(0.0, 1.0);
        self
    }

    pub fn with_fk_max_null_percent(mut self, ratio: f64) -> Self {
        self.fk_max_null_percent = ratio.clamp(0.0, 1.0);
        self
    }

    /// Register a user-confirmed alias set for `base`
    pub fn with_user_alias<I, S>(mut self, base: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_aliases
            .entry(base.into())
            .or_default()
            .extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Priority of a base type name, or the default for unranked types
    pub fn priority_of(&self, base_type: &str) -> f64 {
        self.type_priority
            .get(base_type)
            .copied()
            .unwrap_or(self.default_type_priority)
    }

    /// Whether a full type tag belongs to the ranked set
    pub fn is_ranked(&self, type_tag: &str) -> bool {
        self.type_priority.contains_key(type_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KeyConfig::default();
        assert_eq!(config.priority_of("INT"), 100.0);
        assert_eq!(config.priority_of("FLOAT"), 50.0);
        assert!(config.is_ranked("TEXT"));
        assert!(!config.is_ranked("VARCHAR(40)"));
        assert!(config.default_fk_patterns.contains("_id"));
    }

    #[test]
    fn test_builders_clamp() {
        let config = KeyConfig::new()
            .with_weights(1.5, -1.0)
            .with_fk_unique_range(-0.1, 2.0)
            .with_user_alias("user", ["client", "member"]);
        assert_eq!(config.type_weight, 1.0);
        assert_eq!(config.name_weight, 0.0);
        assert_eq!(config.fk_min_unique_ratio, 0.0);
        assert_eq!(config.fk_max_unique_ratio, 1.0);
        assert_eq!(config.user_aliases["user"].len(), 2);
    }
}
