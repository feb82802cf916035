//! Cross-table fuzzy value matching
//!
//! Compares the value sets of low-cardinality textual columns across every
//! table pair. Each column pair is independent: comparisons run on a bounded
//! rayon pool, a failing pair is logged and contributes nothing, and the
//! combined output is sorted so that scheduling never changes the result.

use std::collections::{HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::cache::{ColumnCache, ColumnKey, NormalizedColumn};
use super::config::FuzzyConfig;
use super::error::{MatchError, MatchResult};
use super::normalize::{normalize_value, partial_ratio};
use crate::ingest::{RawTable, even_sample};
use crate::models::{MatchType, TableProfile};

/// One source value matched to a target value in another table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueMatch {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
    pub source_value: String,
    pub target_value: String,
    pub source_row: usize,
    pub target_row: usize,
    /// Similarity in [0, 1]; 1.0 for exact matches
    pub similarity: f64,
    pub match_type: MatchType,
}

impl ValueMatch {
    /// Qualified `table.column` of the source side
    pub fn source_id(&self) -> String {
        format!("{}.{}", self.source_table, self.source_column)
    }

    /// Qualified `table.column` of the target side
    pub fn target_id(&self) -> String {
        format!("{}.{}", self.target_table, self.target_column)
    }
}

/// A column pair scheduled for comparison
#[derive(Debug, Clone)]
struct PairTask {
    source: ColumnKey,
    target: ColumnKey,
}

/// Value-level matcher with a shared normalization cache
pub struct FuzzyValueMatcher {
    config: FuzzyConfig,
    cache: ColumnCache,
}

impl FuzzyValueMatcher {
    pub fn new(config: FuzzyConfig) -> Self {
        let cache = ColumnCache::new(config.cache_capacity, config.cache_shards);
        Self { config, cache }
    }

    pub fn config(&self) -> &FuzzyConfig {
        &self.config
    }

    /// Match values across all profiled tables.
    ///
    /// `raw` supplies the row data; a profile without a raw table of the
    /// same name is skipped.
    pub fn find_matches(&self, profiles: &[TableProfile], raw: &[RawTable]) -> Vec<ValueMatch> {
        let raw_by_name: HashMap<&str, &RawTable> =
            raw.iter().map(|t| (t.name.as_str(), t)).collect();

        let tasks = self.plan_pairs(profiles, &raw_by_name);
        if tasks.is_empty() {
            debug!("No candidate column pairs for value matching");
            return Vec::new();
        }
        info!(pairs = tasks.len(), workers = self.config.max_workers, "Matching column values");

        let run = |task: &PairTask| self.run_isolated(task, &raw_by_name);
        let batches: Vec<Vec<ValueMatch>> = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.max_workers.max(1))
            .build()
        {
            Ok(pool) => pool.install(|| tasks.par_iter().map(run).collect()),
            Err(e) => {
                warn!(error = %e, "Failed to build matcher pool, comparing sequentially");
                tasks.iter().map(run).collect()
            }
        };

        finalize(batches.into_iter().flatten().collect())
    }

    /// Best choice for a single value at the generic cutoff
    pub fn best_match<'a>(&self, value: &str, choices: &'a [String]) -> Option<(&'a str, f64)> {
        let needle = normalize_value(value)?;
        choices
            .iter()
            .filter_map(|choice| {
                let normalized = normalize_value(choice)?;
                Some((choice.as_str(), partial_ratio(&needle, &normalized)))
            })
            .filter(|(_, score)| *score >= self.config.generic_cutoff)
            .fold(None, |best: Option<(&str, f64)>, (choice, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((choice, score)),
            })
    }

    /// Columns eligible for comparison: textual and below the cardinality ceiling
    fn candidate_columns<'a>(&self, table: &'a TableProfile) -> Vec<&'a str> {
        table
            .columns
            .values()
            .filter(|c| {
                c.detected_type.is_textual() && c.unique_ratio < self.config.cardinality_ceiling
            })
            .map(|c| c.name.as_str())
            .collect()
    }

    fn plan_pairs(
        &self,
        profiles: &[TableProfile],
        raw_by_name: &HashMap<&str, &RawTable>,
    ) -> Vec<PairTask> {
        let mut seen: HashSet<(ColumnKey, ColumnKey)> = HashSet::new();
        let mut tasks = Vec::new();

        for (i, left) in profiles.iter().enumerate() {
            for right in &profiles[i + 1..] {
                let (Some(left_raw), Some(right_raw)) = (
                    raw_by_name.get(left.name.as_str()),
                    raw_by_name.get(right.name.as_str()),
                ) else {
                    continue;
                };

                for source_col in self.candidate_columns(left) {
                    for target_col in self.candidate_columns(right) {
                        let source = (left.name.clone(), source_col.to_string());
                        let target = (right.name.clone(), target_col.to_string());
                        let pair_key = if source <= target {
                            (source.clone(), target.clone())
                        } else {
                            (target.clone(), source.clone())
                        };
                        if !seen.insert(pair_key) {
                            continue;
                        }

                        let target_len = present_count(right_raw.column(target_col));
                        if target_len > self.config.target_value_limit {
                            debug!(
                                target = %format!("{}.{}", target.0, target.1),
                                values = target_len,
                                "Skipping pair, target column too large"
                            );
                            continue;
                        }
                        if left_raw.column(source_col).is_none() {
                            continue;
                        }
                        tasks.push(PairTask { source, target });
                    }
                }
            }
        }
        tasks
    }

    fn run_isolated(
        &self,
        task: &PairTask,
        raw_by_name: &HashMap<&str, &RawTable>,
    ) -> Vec<ValueMatch> {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.compare_pair(task, raw_by_name)))
            .unwrap_or_else(|panic| {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(MatchError::WorkerPanicked {
                    source_column: format!("{}.{}", task.source.0, task.source.1),
                    target_column: format!("{}.{}", task.target.0, task.target.1),
                    message,
                })
            });

        match outcome {
            Ok(matches) => matches,
            Err(e) => {
                error!(
                    source = %format!("{}.{}", task.source.0, task.source.1),
                    target = %format!("{}.{}", task.target.0, task.target.1),
                    error = %e,
                    "Column pair comparison failed"
                );
                Vec::new()
            }
        }
    }

    fn normalized(
        &self,
        key: &ColumnKey,
        raw_by_name: &HashMap<&str, &RawTable>,
    ) -> MatchResult<Arc<NormalizedColumn>> {
        let values = raw_by_name
            .get(key.0.as_str())
            .and_then(|t| t.column(&key.1))
            .ok_or_else(|| MatchError::MissingColumn {
                table: key.0.clone(),
                column: key.1.clone(),
            })?;
        Ok(self.cache.get_or_insert_with(key.clone(), || {
            values
                .iter()
                .enumerate()
                .filter_map(|(row, v)| {
                    let normalized = normalize_value(v.as_deref()?)?;
                    Some((row, normalized))
                })
                .collect()
        }))
    }

    fn compare_pair(
        &self,
        task: &PairTask,
        raw_by_name: &HashMap<&str, &RawTable>,
    ) -> MatchResult<Vec<ValueMatch>> {
        let source = self.normalized(&task.source, raw_by_name)?;
        let target = self.normalized(&task.target, raw_by_name)?;
        let source_raw = raw_values(&task.source, raw_by_name)?;
        let target_raw = raw_values(&task.target, raw_by_name)?;

        let sampled = if source.len() > self.config.source_sample_limit {
            even_sample(&source, self.config.source_sample_limit)
        } else {
            source.to_vec()
        };

        // normalized value -> row, first-seen key order, last row wins
        let mut index: IndexMap<&str, usize> = IndexMap::new();
        for (row, value) in target.iter() {
            index.insert(value.as_str(), *row);
        }

        let mut matches = Vec::new();
        for (source_row, value) in &sampled {
            let hit = match index.get(value.as_str()) {
                Some(row) => Some((*row, 1.0, MatchType::Exact)),
                None => self.nearest(value, &index).map(|(row, score)| (row, score, MatchType::Fuzzy)),
            };
            let Some((target_row, similarity, match_type)) = hit else {
                continue;
            };
            matches.push(ValueMatch {
                source_table: task.source.0.clone(),
                source_column: task.source.1.clone(),
                target_table: task.target.0.clone(),
                target_column: task.target.1.clone(),
                source_value: cell(source_raw, *source_row),
                target_value: cell(target_raw, target_row),
                source_row: *source_row,
                target_row,
                similarity,
                match_type,
            });
        }
        Ok(matches)
    }

    /// Highest-scoring index entry at or above the pair cutoff; the first
    /// entry wins ties.
    fn nearest(&self, value: &str, index: &IndexMap<&str, usize>) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (candidate, row) in index {
            let score = partial_ratio(value, candidate);
            if score >= self.config.pair_cutoff && best.is_none_or(|(_, b)| score > b) {
                best = Some((*row, score));
            }
        }
        best
    }
}

impl Default for FuzzyValueMatcher {
    fn default() -> Self {
        Self::new(FuzzyConfig::default())
    }
}

fn present_count(values: Option<&[Option<String>]>) -> usize {
    values.map_or(0, |v| v.iter().filter(|x| x.is_some()).count())
}

fn raw_values<'a>(
    key: &ColumnKey,
    raw_by_name: &HashMap<&str, &'a RawTable>,
) -> MatchResult<&'a [Option<String>]> {
    raw_by_name
        .get(key.0.as_str())
        .and_then(|t| t.column(&key.1))
        .ok_or_else(|| MatchError::MissingColumn {
            table: key.0.clone(),
            column: key.1.clone(),
        })
}

fn cell(values: &[Option<String>], row: usize) -> String {
    values.get(row).cloned().flatten().unwrap_or_default()
}

/// Sort by a stable key, drop repeated value pairs, then order by
/// descending similarity.
fn finalize(mut matches: Vec<ValueMatch>) -> Vec<ValueMatch> {
    matches.sort_by(|a, b| {
        (&a.source_table, &a.source_column, &a.target_table, &a.target_column, a.source_row)
            .cmp(&(&b.source_table, &b.source_column, &b.target_table, &b.target_column, b.source_row))
    });

    let mut seen: HashSet<(String, String, String, String)> = HashSet::new();
    matches.retain(|m| {
        seen.insert((
            m.source_value.clone(),
            m.target_value.clone(),
            m.source_table.clone(),
            m.target_table.clone(),
        ))
    });

    matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnProfile, SqlType};

    fn raw(name: &str, columns: &[(&str, &[&str])]) -> RawTable {
        let mut table = RawTable::new(name);
        for (col, values) in columns {
            table.push_column(
                col.to_string(),
                values.iter().map(|v| Some(v.to_string())).collect(),
            );
        }
        table
    }

    fn text_col(name: &str, unique: f64) -> ColumnProfile {
        ColumnProfile::new(name, SqlType::Varchar(30), unique, 0.0, vec![])
    }

    fn fixture() -> (Vec<TableProfile>, Vec<RawTable>) {
        let customers = raw(
            "customers",
            &[("city", &["Berlin", "Paris", "Berlin", "Paris", "Munich"])],
        );
        let orders = raw(
            "orders",
            &[("ship_city", &["berlin", "PARIS", "Munchen", "berlin"])],
        );
        let profiles = vec![
            TableProfile::new("customers").with_column(text_col("city", 0.6)),
            TableProfile::new("orders").with_column(text_col("ship_city", 0.75)),
        ];
        (profiles, vec![customers, orders])
    }

    #[test]
    fn test_exact_matches_after_normalization() {
        let (profiles, raw) = fixture();
        let matches = FuzzyValueMatcher::default().find_matches(&profiles, &raw);

        assert!(!matches.is_empty());
        let exact: Vec<_> = matches
            .iter()
            .filter(|m| m.match_type == MatchType::Exact)
            .collect();
        assert!(exact.iter().any(|m| m.source_value == "Berlin" && m.target_value == "berlin"));
        assert!(exact.iter().all(|m| m.similarity == 1.0));
        assert_eq!(matches[0].source_id(), "customers.city");
        assert_eq!(matches[0].target_id(), "orders.ship_city");
    }

    #[test]
    fn test_output_is_deterministic_and_sorted() {
        let (profiles, raw) = fixture();
        let first = FuzzyValueMatcher::new(FuzzyConfig::default().with_max_workers(4))
            .find_matches(&profiles, &raw);
        let second = FuzzyValueMatcher::new(FuzzyConfig::default().with_max_workers(1))
            .find_matches(&profiles, &raw);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_high_cardinality_columns_are_skipped() {
        let (mut profiles, raw) = fixture();
        profiles[1] = TableProfile::new("orders").with_column(text_col("ship_city", 0.95));
        let matches = FuzzyValueMatcher::default().find_matches(&profiles, &raw);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_non_textual_columns_are_skipped() {
        let (mut profiles, raw) = fixture();
        profiles[1] = TableProfile::new("orders")
            .with_column(ColumnProfile::new("ship_city", SqlType::Int, 0.5, 0.0, vec![]));
        assert!(FuzzyValueMatcher::default().find_matches(&profiles, &raw).is_empty());
    }

    #[test]
    fn test_target_cap_skips_pair() {
        let many: Vec<String> = (0..20).map(|i| format!("v{}", i % 3)).collect();
        let many_refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let raw_tables = vec![
            raw("a", &[("kind", &["v0", "v1"])]),
            raw("b", &[("kind", &many_refs)]),
        ];
        let profiles = vec![
            TableProfile::new("a").with_column(text_col("kind", 0.5)),
            TableProfile::new("b").with_column(text_col("kind", 0.15)),
        ];
        let mut config = FuzzyConfig::default();
        config.target_value_limit = 10;
        let matcher = FuzzyValueMatcher::new(config);
        assert!(matcher.find_matches(&profiles, &raw_tables).is_empty());

        let matcher = FuzzyValueMatcher::default();
        assert_eq!(matcher.find_matches(&profiles, &raw_tables).len(), 2);
    }

    #[test]
    fn test_missing_source_column_is_not_planned() {
        let (mut profiles, raw) = fixture();
        profiles[0].insert_column(text_col("ghost", 0.5));
        let matches = FuzzyValueMatcher::default().find_matches(&profiles, &raw);
        assert!(matches.iter().all(|m| m.source_column != "ghost"));
        assert!(!matches.is_empty());
    }

    #[test]
    fn test_failed_pair_does_not_drop_sibling_pairs() {
        let (profiles, raw) = fixture();
        let expected = FuzzyValueMatcher::default().find_matches(&profiles, &raw);

        // orders.ghost has a profile but no row data, so its pair errors out
        let mut with_ghost = profiles.clone();
        with_ghost[1].insert_column(text_col("ghost", 0.5));
        let matcher = FuzzyValueMatcher::default();
        let raw_by_name: HashMap<&str, &RawTable> =
            raw.iter().map(|t| (t.name.as_str(), t)).collect();
        let tasks = matcher.plan_pairs(&with_ghost, &raw_by_name);
        let ghost_task = tasks
            .iter()
            .find(|t| t.target.1 == "ghost")
            .expect("ghost pair is planned");
        assert!(matcher.run_isolated(ghost_task, &raw_by_name).is_empty());

        let matches = matcher.find_matches(&with_ghost, &raw);
        assert!(!matches.is_empty());
        assert!(matches.iter().all(|m| m.target_column != "ghost"));
        assert_eq!(matches, expected);
    }

    #[test]
    fn test_best_match() {
        let matcher = FuzzyValueMatcher::default();
        let choices = vec!["New York".to_string(), "Boston".to_string()];
        let (choice, score) = matcher.best_match("new-york", &choices).unwrap();
        assert_eq!(choice, "New York");
        assert_eq!(score, 1.0);
        assert!(matcher.best_match("Chicago", &choices).is_none());
    }
}
