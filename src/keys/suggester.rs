//! Primary key ranking and foreign key suggestion
//!
//! Works in two phases. Pattern discovery scans every profiled column and
//! learns naming patterns from columns that look like primary keys (fully
//! unique, ranked type) or foreign keys (partially unique, mostly present).
//! Scoring then ranks PK candidates per table, detects alias columns that
//! share identical value fingerprints, and proposes FK candidates for every
//! ordered table pair.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::KeyConfig;
use crate::models::{ColumnProfile, MatchType, RelationshipCandidate, TableProfile};

pub const REASON_USER_ALIAS: &str = "user_alias_match";
pub const REASON_DETECTED_ALIAS: &str = "alias_match";
pub const REASON_DIRECT: &str = "direct_match";
pub const REASON_NAME_AND_TYPE: &str = "name_and_type_match";

/// Naming patterns learned from the profiled columns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredPatterns {
    pub primary: BTreeSet<String>,
    pub foreign: BTreeSet<String>,
}

/// Best-scoring primary key column of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKeyCandidate {
    pub table: String,
    pub column: String,
    pub score: f64,
}

/// Everything the suggester learns about a set of tables
#[derive(Debug, Clone, Default)]
pub struct KeyAnalysis {
    pub patterns: DiscoveredPatterns,
    /// Table name -> selected primary key
    pub primary_keys: IndexMap<String, PrimaryKeyCandidate>,
    /// Detected alias groups: base name -> column names
    pub detected_aliases: BTreeMap<String, BTreeSet<String>>,
}

/// Scores primary key candidates and proposes foreign key relationships.
#[derive(Debug, Clone, Default)]
pub struct RelationshipSuggester {
    config: KeyConfig,
}

impl RelationshipSuggester {
    pub fn new(config: KeyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KeyConfig {
        &self.config
    }

    /// Learn PK and FK naming patterns from all columns.
    ///
    /// Each kind falls back to its default vocabulary when nothing is found.
    pub fn discover_patterns(&self, tables: &[TableProfile]) -> DiscoveredPatterns {
        let mut patterns = DiscoveredPatterns::default();

        for column in tables.iter().flat_map(|t| t.columns.values()) {
            let target = if column.is_fully_unique()
                && self.config.is_ranked(&column.detected_type.to_string())
            {
                &mut patterns.primary
            } else if self.is_fk_shaped(column) {
                &mut patterns.foreign
            } else {
                continue;
            };

            let lowered = column.name.to_lowercase();
            if let Some((_, suffix)) = lowered.rsplit_once('_') {
                target.insert(suffix.to_string());
                target.insert(format!("_{suffix}"));
            }
            target.insert(lowered);
        }

        if patterns.primary.is_empty() {
            patterns.primary = self.config.default_pk_patterns.clone();
        }
        if patterns.foreign.is_empty() {
            patterns.foreign = self.config.default_fk_patterns.clone();
        }

        debug!(
            primary = patterns.primary.len(),
            foreign = patterns.foreign.len(),
            "Key patterns discovered"
        );
        patterns
    }

    /// Score a column as a primary key, or `None` if it is not eligible.
    pub fn score_primary_key(
        &self,
        column: &ColumnProfile,
        patterns: &DiscoveredPatterns,
    ) -> Option<f64> {
        if column.unique_ratio >= 1.0 {
            let distinct: HashSet<&str> =
                column.sample_values.iter().map(String::as_str).collect();
            if distinct.len() <= 1 {
                info!(column = %column.name, "Skipping constant column as primary key candidate");
                return None;
            }
        }

        if !column.is_fully_unique() || !self.config.is_ranked(&column.detected_type.to_string())
        {
            return None;
        }

        let type_score = self
            .config
            .priority_of(&column.detected_type.base_name().to_uppercase());
        let lowered = column.name.to_lowercase();
        let name_score = if patterns.primary.is_empty() {
            50.0
        } else if patterns.primary.iter().any(|p| lowered.contains(p.as_str())) {
            100.0
        } else {
            0.0
        };

        let score = self.config.type_weight * type_score + self.config.name_weight * name_score;
        (score >= self.config.min_pk_score).then_some(score)
    }

    /// Pick the highest-scoring PK candidate of each table; ties keep the
    /// earlier column.
    pub fn primary_key_candidates(
        &self,
        tables: &[TableProfile],
        patterns: &DiscoveredPatterns,
    ) -> IndexMap<String, PrimaryKeyCandidate> {
        let mut selected = IndexMap::new();

        for table in tables {
            let mut best: Option<PrimaryKeyCandidate> = None;
            for column in table.columns.values() {
                let Some(score) = self.score_primary_key(column, patterns) else {
                    continue;
                };
                if best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(PrimaryKeyCandidate {
                        table: table.name.clone(),
                        column: column.name.clone(),
                        score,
                    });
                }
            }
            if let Some(candidate) = best {
                debug!(table = %table.name, column = %candidate.column, score = candidate.score, "Primary key selected");
                selected.insert(table.name.clone(), candidate);
            }
        }

        selected
    }

    /// Whether a column may act as a foreign key, by name or by shape.
    pub fn could_be_foreign_key(&self, column: &ColumnProfile, patterns: &DiscoveredPatterns) -> bool {
        let lowered = column.name.to_lowercase();
        patterns.foreign.iter().any(|p| lowered.contains(p.as_str()))
            || (self.is_fk_shaped(column)
                && self.config.is_ranked(&column.detected_type.to_string()))
    }

    /// Group FK-eligible columns whose sample fingerprints coincide and
    /// derive a shared base name from their common prefix.
    pub fn detect_aliases(
        &self,
        tables: &[TableProfile],
        patterns: &DiscoveredPatterns,
    ) -> BTreeMap<String, BTreeSet<String>> {
        let mut by_fingerprint: BTreeMap<BTreeSet<String>, Vec<String>> = BTreeMap::new();

        for column in tables.iter().flat_map(|t| t.columns.values()) {
            if !self.could_be_foreign_key(column, patterns) {
                continue;
            }
            let fingerprint: BTreeSet<String> = column
                .sample_values
                .iter()
                .take(self.config.fingerprint_size)
                .map(|v| v.trim().to_lowercase())
                .collect();
            if fingerprint.is_empty() {
                continue;
            }
            by_fingerprint
                .entry(fingerprint)
                .or_default()
                .push(column.name.clone());
        }

        let mut aliases: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for names in by_fingerprint.into_values().filter(|n| n.len() > 1) {
            let stripped: Vec<String> = names.iter().map(|n| strip_key_suffixes(n)).collect();
            let base = common_prefix(&stripped);
            if base.is_empty() {
                continue;
            }
            debug!(base = %base, columns = ?names, "Alias group detected");
            aliases.entry(base).or_default().extend(names);
        }
        aliases
    }

    /// Run pattern discovery, PK selection and alias detection.
    pub fn analyze(&self, tables: &[TableProfile]) -> KeyAnalysis {
        let patterns = self.discover_patterns(tables);
        let primary_keys = self.primary_key_candidates(tables, &patterns);
        let detected_aliases = self.detect_aliases(tables, &patterns);
        KeyAnalysis {
            patterns,
            primary_keys,
            detected_aliases,
        }
    }

    /// Every alias vocabulary in effect: built-in, detected and
    /// user-confirmed sets merged per base name.
    ///
    /// Only user-confirmed and detected aliases drive FK candidates.
    pub fn active_aliases(&self, analysis: &KeyAnalysis) -> BTreeMap<String, BTreeSet<String>> {
        let mut merged = self.config.builtin_aliases.clone();
        for source in [&analysis.detected_aliases, &self.config.user_aliases] {
            for (base, names) in source {
                merged.entry(base.clone()).or_default().extend(names.iter().cloned());
            }
        }
        merged
    }

    /// Propose FK candidates for every ordered pair of distinct tables.
    ///
    /// Candidates for the same edge found by different rules are all kept.
    /// The result is sorted by descending confidence, then reason.
    pub fn suggest_relationships(&self, tables: &[TableProfile]) -> Vec<RelationshipCandidate> {
        let analysis = self.analyze(tables);
        self.suggest_with(tables, &analysis)
    }

    /// [`suggest_relationships`](Self::suggest_relationships) over a
    /// precomputed analysis.
    pub fn suggest_with(
        &self,
        tables: &[TableProfile],
        analysis: &KeyAnalysis,
    ) -> Vec<RelationshipCandidate> {
        let alias_sources: [(&BTreeMap<String, BTreeSet<String>>, f64, &str); 2] = [
            (
                &self.config.user_aliases,
                self.config.user_alias_confidence,
                REASON_USER_ALIAS,
            ),
            (
                &analysis.detected_aliases,
                self.config.detected_alias_confidence,
                REASON_DETECTED_ALIAS,
            ),
        ];

        let mut candidates = Vec::new();

        for source in tables {
            for target in tables {
                if source.name == target.name {
                    continue;
                }
                let Some(pk) = analysis.primary_keys.get(&target.name) else {
                    continue;
                };
                let Some(target_pk) = target.column(&pk.column) else {
                    continue;
                };
                if !target_pk.is_fully_unique() {
                    continue;
                }

                for column in source.columns.values() {
                    if !self.could_be_foreign_key(column, &analysis.patterns) {
                        continue;
                    }
                    let src = (source.name.as_str(), column.name.as_str());
                    let tgt = (target.name.as_str(), target_pk.name.as_str());

                    for (aliases, confidence, reason) in &alias_sources {
                        if aliases.values().any(|set| matches_alias(&column.name, set)) {
                            candidates.push(RelationshipCandidate::new(
                                src,
                                tgt,
                                *confidence,
                                MatchType::Inferred,
                                *reason,
                            ));
                        }
                    }

                    if is_direct_match(&column.name, &target_pk.name, &target.name) {
                        candidates.push(RelationshipCandidate::new(
                            src,
                            tgt,
                            self.config.direct_match_confidence,
                            MatchType::Exact,
                            REASON_DIRECT,
                        ));
                    }

                    if column.name == target_pk.name
                        && column.detected_type == target_pk.detected_type
                    {
                        candidates.push(RelationshipCandidate::new(
                            src,
                            tgt,
                            self.config.name_and_type_confidence,
                            MatchType::Exact,
                            REASON_NAME_AND_TYPE,
                        ));
                    }
                }
            }
        }

        sort_candidates(&mut candidates);
        info!(count = candidates.len(), "Relationship candidates suggested");
        candidates
    }

    fn is_fk_shaped(&self, column: &ColumnProfile) -> bool {
        column.unique_ratio > self.config.fk_min_unique_ratio
            && column.unique_ratio < self.config.fk_max_unique_ratio
            && column.null_percent < self.config.fk_max_null_percent
    }
}

/// Keep only the highest-confidence candidate per (source, target) edge,
/// preserving the order of first appearance after sorting.
pub fn deduplicate_by_confidence(candidates: &[RelationshipCandidate]) -> Vec<RelationshipCandidate> {
    let mut sorted = candidates.to_vec();
    sort_candidates(&mut sorted);

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|c| {
            seen.insert((
                c.source_table.clone(),
                c.source_column.clone(),
                c.target_table.clone(),
                c.target_column.clone(),
            ))
        })
        .collect()
}

fn sort_candidates(candidates: &mut [RelationshipCandidate]) {
    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.reason.cmp(&b.reason))
    });
}

fn strip_key_suffixes(name: &str) -> String {
    name.to_lowercase().replace("_id", "").replace("_fk", "")
}

fn matches_alias(column: &str, aliases: &BTreeSet<String>) -> bool {
    let lowered = column.to_lowercase();
    let base = strip_key_suffixes(column);
    aliases.contains(&base) || aliases.iter().any(|a| lowered.contains(a.as_str()))
}

fn is_direct_match(column: &str, target_pk: &str, target_table: &str) -> bool {
    if target_pk != "id" {
        return false;
    }
    let prefix = column.to_lowercase().replace("_id", "");
    !prefix.is_empty() && target_table.to_lowercase().contains(&prefix)
}

fn common_prefix(names: &[String]) -> String {
    let Some(first) = names.first() else {
        return String::new();
    };
    let mut prefix: &str = first;
    for name in &names[1..] {
        let shared = prefix
            .char_indices()
            .zip(name.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, c), _)| i + c.len_utf8())
            .unwrap_or(0);
        prefix = &prefix[..shared];
    }
    prefix.to_string()
}
