//! Canonical entity names for column groups

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::config::GroupingConfig;
use super::grouper::ColumnGroup;

static TOKEN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[_\W]+").unwrap());

/// A column group with its derived entity name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalGroup {
    pub entity_name: String,
    /// Qualified column identifiers, sorted
    pub columns: Vec<String>,
}

/// Column part of a qualified identifier (after the last `.`)
pub fn local_name(qualified: &str) -> &str {
    qualified.rsplit_once('.').map_or(qualified, |(_, column)| column)
}

fn tokens(column: &str, config: &GroupingConfig) -> Vec<String> {
    let mut tokens: Vec<String> = TOKEN_SPLIT
        .split(&column.to_lowercase())
        .filter(|t| !t.is_empty() && !config.stop_tokens.contains(*t))
        .map(String::from)
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

/// Derive the canonical name of one group.
///
/// Tokens shared by at least `min_common_ratio` of the members are ranked
/// by frequency then alphabetically; a priority token among them wins,
/// otherwise the top-ranked one. Without common tokens the shortest member
/// name is used.
pub fn canonical_name(group: &ColumnGroup, config: &GroupingConfig) -> String {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for column in group {
        for token in tokens(local_name(column), config) {
            *counts.entry(token).or_default() += 1;
        }
    }

    let members = group.len().max(1) as f64;
    let mut common: Vec<(String, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count as f64 / members >= config.min_common_ratio)
        .collect();
    common.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    if let Some((token, _)) = common
        .iter()
        .find(|(token, _)| config.priority_tokens.contains(token))
    {
        return token.clone();
    }
    if let Some((token, _)) = common.first() {
        return token.clone();
    }

    group
        .iter()
        .map(|c| local_name(c))
        .min_by_key(|name| name.len())
        .unwrap_or_default()
        .to_string()
}

/// Name every group, keeping the input order
pub fn suggest_canonical_names(groups: &[ColumnGroup], config: &GroupingConfig) -> Vec<CanonicalGroup> {
    groups
        .iter()
        .map(|group| CanonicalGroup {
            entity_name: canonical_name(group, config),
            columns: group.iter().cloned().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> ColumnGroup {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_priority_token_wins() {
        let group = set(&["users.full_name", "clients.client_name", "clients.client_id"]);
        assert_eq!(canonical_name(&group, &GroupingConfig::default()), "name");
    }

    #[test]
    fn test_most_frequent_then_alphabetical() {
        let config = GroupingConfig::default();
        let group = set(&["a.customer_city", "b.customer_town", "c.city"]);
        assert_eq!(canonical_name(&group, &config), "city");

        let group = set(&["a.ship_city", "b.ship_city_code"]);
        assert_eq!(canonical_name(&group, &config), "city");
    }

    #[test]
    fn test_stop_tokens_and_shortest_fallback() {
        let config = GroupingConfig::default().with_min_common_ratio(1.0);
        let group = set(&["a.alpha_id", "b.beta_ref", "c.gamma"]);
        assert_eq!(canonical_name(&group, &config), "gamma");
    }

    #[test]
    fn test_dotted_table_names() {
        assert_eq!(local_name("test.json.metadata_source"), "metadata_source");
        assert_eq!(local_name("bare"), "bare");
    }

    #[test]
    fn test_suggest_canonical_names_sorted_columns() {
        let groups = vec![set(&["orders.customer_name", "customers.name"])];
        let named = suggest_canonical_names(&groups, &GroupingConfig::default());
        assert_eq!(named[0].entity_name, "name");
        assert_eq!(named[0].columns, vec!["customers.name", "orders.customer_name"]);
    }
}
