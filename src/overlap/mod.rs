//! Table overlap report
//!
//! Jaccard similarity of column-name sets for every unordered pair of
//! tables, used to point out uploads that likely describe the same data.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::TableProfile;

/// Reports below this score are dropped
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOverlap {
    pub table_a: String,
    pub table_b: String,
    /// Jaccard similarity rounded to two decimals
    pub score: f64,
}

/// Jaccard similarity of two column-name sets, 0.0 when both are empty
pub fn jaccard<'a>(
    a: impl IntoIterator<Item = &'a str>,
    b: impl IntoIterator<Item = &'a str>,
) -> f64 {
    let a: HashSet<&str> = a.into_iter().collect();
    let b: HashSet<&str> = b.into_iter().collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Overlap of every table pair `(i, j)` with `i < j` scoring at least
/// `threshold`, in table order.
pub fn detect_overlapping_tables(tables: &[TableProfile], threshold: f64) -> Vec<TableOverlap> {
    let mut overlaps = Vec::new();
    for (i, a) in tables.iter().enumerate() {
        for b in &tables[i + 1..] {
            let score = jaccard(a.column_names(), b.column_names());
            if score >= threshold {
                overlaps.push(TableOverlap {
                    table_a: a.name.clone(),
                    table_b: b.name.clone(),
                    score: (score * 100.0).round() / 100.0,
                });
            }
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnProfile, SqlType};

    fn table(name: &str, columns: &[&str]) -> TableProfile {
        columns.iter().fold(TableProfile::new(name), |t, c| {
            t.with_column(ColumnProfile::new(*c, SqlType::Text, 0.5, 0.0, vec![]))
        })
    }

    #[test]
    fn test_pairwise_scores() {
        let tables = vec![
            table("a", &["id", "name", "email"]),
            table("b", &["id", "total"]),
            table("c", &["sku"]),
        ];
        let overlaps = detect_overlapping_tables(&tables, DEFAULT_OVERLAP_THRESHOLD);
        assert_eq!(
            overlaps,
            vec![TableOverlap {
                table_a: "a".into(),
                table_b: "b".into(),
                score: 0.25,
            }]
        );
    }

    #[test]
    fn test_rounding() {
        let tables = vec![table("a", &["x", "y", "z"]), table("b", &["x"])];
        let overlaps = detect_overlapping_tables(&tables, 0.0);
        assert_eq!(overlaps[0].score, 0.33);
    }

    #[test]
    fn test_empty_sets() {
        assert_eq!(jaccard(Vec::<&str>::new(), Vec::<&str>::new()), 0.0);
    }
}
