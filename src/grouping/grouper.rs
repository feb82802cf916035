//! Column clustering over fuzzy match edges

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use tracing::debug;

use super::config::GroupingConfig;
use crate::matching::ValueMatch;
use crate::models::TableProfile;

/// Qualified `table.column` identifiers believed to denote one entity
pub type ColumnGroup = BTreeSet<String>;

/// Clusters matched columns into entity groups
#[derive(Debug, Clone, Default)]
pub struct EntityGrouper {
    config: GroupingConfig,
}

impl EntityGrouper {
    pub fn new(config: GroupingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GroupingConfig {
        &self.config
    }

    /// Connected components of the match graph, restricted to edges at or
    /// above the grouping threshold. Components come out in the order their
    /// first column was seen.
    pub fn group(&self, matches: &[ValueMatch]) -> Vec<ColumnGroup> {
        let mut graph = UnGraph::<String, f64>::new_undirected();
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();

        for m in matches.iter().filter(|m| m.similarity >= self.config.threshold) {
            let source = *node_map
                .entry(m.source_id())
                .or_insert_with_key(|id| graph.add_node(id.clone()));
            let target = *node_map
                .entry(m.target_id())
                .or_insert_with_key(|id| graph.add_node(id.clone()));
            graph.update_edge(source, target, m.similarity);
        }

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut groups = Vec::new();
        for start in graph.node_indices() {
            if visited.contains(&start) {
                continue;
            }
            let mut component = ColumnGroup::new();
            let mut bfs = Bfs::new(&graph, start);
            while let Some(node) = bfs.next(&graph) {
                visited.insert(node);
                component.insert(graph[node].clone());
            }
            groups.push(component);
        }

        if self.config.merge_overlap {
            groups = merge_overlapping(groups);
        }

        let before = groups.len();
        groups.retain(|g| g.len() >= self.config.min_group_size);
        debug!(
            components = before,
            groups = groups.len(),
            "Grouped matched columns"
        );
        groups
    }
}

/// Coalesce groups sharing any column until no two groups overlap. Applying
/// it to its own output changes nothing.
pub fn merge_overlapping(groups: Vec<ColumnGroup>) -> Vec<ColumnGroup> {
    let mut current = groups;
    loop {
        let mut merged_any = false;
        let mut next: Vec<ColumnGroup> = Vec::with_capacity(current.len());
        for group in current {
            match next.iter_mut().find(|existing| !existing.is_disjoint(&group)) {
                Some(existing) => {
                    existing.extend(group);
                    merged_any = true;
                }
                None => next.push(group),
            }
        }
        current = next;
        if !merged_any {
            return current;
        }
    }
}

/// Deterministic fallback: group columns whose names share the same first
/// `_`-separated token, keeping groups of at least `min_group_size`.
pub fn group_by_leading_token(profiles: &[TableProfile], min_group_size: usize) -> Vec<ColumnGroup> {
    let mut by_token: IndexMap<String, ColumnGroup> = IndexMap::new();
    for table in profiles {
        for column in table.column_names() {
            let token = column.split('_').next().unwrap_or(column).to_lowercase();
            by_token
                .entry(token)
                .or_default()
                .insert(format!("{}.{}", table.name, column));
        }
    }
    by_token
        .into_values()
        .filter(|g| g.len() >= min_group_size)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnProfile, MatchType, SqlType};

    fn edge(a: (&str, &str), b: (&str, &str), similarity: f64) -> ValueMatch {
        ValueMatch {
            source_table: a.0.into(),
            source_column: a.1.into(),
            target_table: b.0.into(),
            target_column: b.1.into(),
            source_value: "x".into(),
            target_value: "x".into(),
            source_row: 0,
            target_row: 0,
            similarity,
            match_type: MatchType::Fuzzy,
        }
    }

    fn set(items: &[&str]) -> ColumnGroup {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_connected_components() {
        let matches = vec![
            edge(("a", "city"), ("b", "town"), 0.9),
            edge(("b", "town"), ("c", "place"), 0.95),
            edge(("a", "name"), ("b", "label"), 1.0),
            edge(("a", "x"), ("b", "y"), 0.5),
        ];
        let groups = EntityGrouper::default().group(&matches);
        assert_eq!(
            groups,
            vec![set(&["a.city", "b.town", "c.place"]), set(&["a.name", "b.label"])]
        );
    }

    #[test]
    fn test_min_group_size() {
        let matches = vec![
            edge(("a", "city"), ("b", "town"), 0.9),
            edge(("b", "town"), ("c", "place"), 0.95),
            edge(("a", "name"), ("b", "label"), 1.0),
        ];
        let grouper = EntityGrouper::new(GroupingConfig::default().with_min_group_size(3));
        let groups = grouper.group(&matches);
        assert_eq!(groups.len(), 1);
        assert!(groups.iter().all(|g| g.len() >= 3));
    }

    #[test]
    fn test_merge_overlapping_is_idempotent() {
        let groups = vec![set(&["a.x", "b.y"]), set(&["c.z"]), set(&["b.y", "d.w"]), set(&["d.w", "e.v"])];
        let merged = merge_overlapping(groups);
        assert_eq!(merged, vec![set(&["a.x", "b.y", "d.w", "e.v"]), set(&["c.z"])]);
        assert_eq!(merge_overlapping(merged.clone()), merged);
    }

    #[test]
    fn test_group_by_leading_token() {
        let profiles = vec![
            TableProfile::new("t")
                .with_column(ColumnProfile::new("customer_name", SqlType::Text, 0.5, 0.0, vec![]))
                .with_column(ColumnProfile::new("customer_email", SqlType::Text, 1.0, 0.0, vec![]))
                .with_column(ColumnProfile::new("amount", SqlType::Float, 0.9, 0.0, vec![])),
        ];
        let groups = group_by_leading_token(&profiles, 2);
        assert_eq!(groups, vec![set(&["t.customer_email", "t.customer_name"])]);
    }
}
