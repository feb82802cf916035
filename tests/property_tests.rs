//! Invariant checks across inference, key detection and grouping

use std::collections::BTreeSet;

use schema_inference_sdk::grouping::{ColumnGroup, merge_overlapping};
use schema_inference_sdk::ingest::{IngestConfig, RawTable, profile_table};
use schema_inference_sdk::matching::ValueMatch;
use schema_inference_sdk::models::{MatchType, SqlType, TableProfile};
use schema_inference_sdk::{
    EntityGrouper, GroupingConfig, KeyConfig, RelationshipSuggester, find_composite_key,
    infer_column_type,
};

fn raw(name: &str, headers: &[&str], rows: &[&[&str]]) -> RawTable {
    RawTable::from_rows(
        name,
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|r| {
                r.iter()
                    .map(|v| (!v.is_empty()).then(|| v.to_string()))
                    .collect()
            })
            .collect(),
    )
}

fn profile(table: &RawTable) -> TableProfile {
    profile_table(table, &IngestConfig::default())
}

fn edge(a: &str, b: &str, similarity: f64) -> ValueMatch {
    let (source_table, source_column) = a.split_once('.').unwrap();
    let (target_table, target_column) = b.split_once('.').unwrap();
    ValueMatch {
        source_table: source_table.into(),
        source_column: source_column.into(),
        target_table: target_table.into(),
        target_column: target_column.into(),
        source_value: "v".into(),
        target_value: "v".into(),
        source_row: 0,
        target_row: 0,
        similarity,
        match_type: MatchType::Fuzzy,
    }
}

mod type_inference_tests {
    use super::*;

    #[test]
    fn test_boolean_tokens_win() {
        for values in [
            vec!["1", "0", "1"],
            vec!["yes", "no"],
            vec!["TRUE", "false", "True"],
        ] {
            assert_eq!(infer_column_type(&values), SqlType::Boolean, "{values:?}");
        }
    }

    #[test]
    fn test_varchar_lengths_are_rounded() {
        match infer_column_type(&["a", "abcdefghijk"]) {
            SqlType::Varchar(len) => {
                assert_eq!(len % 10, 0);
                assert!(len >= 11);
            }
            other => panic!("expected VARCHAR, got {other}"),
        }
    }
}

mod composite_key_tests {
    use super::*;

    #[test]
    fn test_unique_column_is_single_key() {
        let table = raw(
            "t",
            &["kind", "code", "label"],
            &[&["a", "1", "x"], &["a", "2", "x"], &["b", "3", "y"]],
        );
        assert_eq!(find_composite_key(&table, 3), vec!["code"]);
    }

    #[test]
    fn test_no_key_within_limit() {
        let table = raw(
            "t",
            &["a", "b"],
            &[&["1", "1"], &["1", "1"], &["2", "2"]],
        );
        assert!(find_composite_key(&table, 2).is_empty());
        assert!(find_composite_key(&table, 0).is_empty());
    }

    #[test]
    fn test_found_key_is_unique_projection() {
        let table = raw(
            "t",
            &["region", "year", "quarter", "revenue"],
            &[
                &["eu", "2023", "q1", "10"],
                &["eu", "2023", "q2", "10"],
                &["us", "2023", "q1", "12"],
                &["us", "2024", "q1", "12"],
                &["eu", "2024", "q1", "11"],
            ],
        );
        let key = find_composite_key(&table, 3);
        assert!(!key.is_empty() && key.len() <= 3);

        let projected: BTreeSet<Vec<Option<String>>> = (0..table.row_count())
            .map(|row| {
                key.iter()
                    .map(|c| table.column(c).and_then(|values| values[row].clone()))
                    .collect()
            })
            .collect();
        assert_eq!(projected.len(), table.row_count());
    }
}

mod relationship_tests {
    use super::*;

    #[test]
    fn test_targets_are_fully_unique() {
        let customers = raw(
            "customers",
            &["id", "name", "region"],
            &[
                &["1", "Ann", "north"],
                &["2", "Bo", "south"],
                &["3", "Cy", "north"],
                &["4", "Di", "east"],
            ],
        );
        let orders = raw(
            "orders",
            &["id", "customer_id", "region"],
            &[
                &["10", "1", "north"],
                &["11", "1", "north"],
                &["12", "2", "south"],
                &["13", "4", "east"],
                &["14", "4", "east"],
            ],
        );
        let profiles = vec![profile(&customers), profile(&orders)];

        let candidates =
            RelationshipSuggester::new(KeyConfig::default()).suggest_relationships(&profiles);
        assert!(!candidates.is_empty());
        for candidate in &candidates {
            assert_ne!(candidate.source_table, candidate.target_table);
            let target = profiles
                .iter()
                .find(|t| t.name == candidate.target_table)
                .and_then(|t| t.column(&candidate.target_column))
                .unwrap();
            assert!(target.is_fully_unique(), "{candidate:?}");
            assert!((0.0..=1.0).contains(&candidate.confidence));
        }
        assert!(candidates.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }
}

mod grouping_tests {
    use super::*;

    #[test]
    fn test_groups_respect_min_size() {
        let matches = vec![
            edge("a.name", "b.customer", 0.95),
            edge("b.customer", "c.client", 0.9),
            edge("a.city", "b.town", 0.92),
            edge("a.sku", "c.product", 0.5),
        ];
        for min_group_size in 1..=4 {
            let config = GroupingConfig::default()
                .with_threshold(0.85)
                .with_min_group_size(min_group_size);
            let groups = EntityGrouper::new(config).group(&matches);
            assert!(groups.iter().all(|g| g.len() >= min_group_size));
            assert!(groups.iter().flatten().all(|c| !c.starts_with("a.sku")));
        }
    }

    #[test]
    fn test_merge_is_idempotent() {
        let groups: Vec<ColumnGroup> = vec![
            ["a.x", "b.y"].iter().map(|s| s.to_string()).collect(),
            ["b.y", "c.z"].iter().map(|s| s.to_string()).collect(),
            ["d.w"].iter().map(|s| s.to_string()).collect(),
            ["c.z", "e.v"].iter().map(|s| s.to_string()).collect(),
        ];
        let once = merge_overlapping(groups);
        assert_eq!(once.len(), 2);
        assert_eq!(merge_overlapping(once.clone()), once);
        for (i, a) in once.iter().enumerate() {
            for b in &once[i + 1..] {
                assert!(a.is_disjoint(b));
            }
        }
    }
}
