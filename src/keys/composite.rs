//! Composite key search
//!
//! Exhaustive search over column combinations of size 1..=k. The cost grows
//! combinatorially with `k`, so callers keep it small (default 3).

use std::collections::HashSet;

use itertools::Itertools;
use tracing::debug;

use crate::ingest::RawTable;

/// Default maximum number of columns in a composite key
pub const DEFAULT_MAX_KEY_COLUMNS: usize = 3;

/// Find the smallest, earliest column combination that uniquely identifies
/// every row of `table`.
///
/// Combinations where some but not all projected cells are absent are
/// skipped. A combination that is absent in every row is still considered,
/// but its rows all repeat the same empty tuple, so it only qualifies for a
/// single-row table.
/// Returns an empty vector when no key of at most `max_columns` columns
/// exists.
pub fn find_composite_key(table: &RawTable, max_columns: usize) -> Vec<String> {
    let names: Vec<&str> = table.column_names().collect();
    if names.is_empty() || table.row_count() == 0 {
        return Vec::new();
    }

    let limit = max_columns.min(names.len());
    for size in 1..=limit {
        for combo in names.iter().copied().combinations(size) {
            let columns: Vec<&[Option<String>]> = combo
                .iter()
                .filter_map(|name| table.column(name))
                .collect();
            if columns.len() != combo.len() {
                continue;
            }

            if has_partial_nulls(&columns) {
                continue;
            }

            if is_unique(&columns, table.row_count()) {
                debug!(table = %table.name, columns = ?combo, "Composite key found");
                return combo.into_iter().map(str::to_string).collect();
            }
        }
    }

    debug!(table = %table.name, max_columns, "No composite key within limit");
    Vec::new()
}

fn has_partial_nulls(columns: &[&[Option<String>]]) -> bool {
    let total = columns.iter().map(|c| c.len()).sum::<usize>();
    let nulls = columns
        .iter()
        .map(|c| c.iter().filter(|v| v.is_none()).count())
        .sum::<usize>();
    nulls > 0 && nulls < total
}

fn is_unique(columns: &[&[Option<String>]], rows: usize) -> bool {
    let mut seen: HashSet<Vec<Option<&str>>> = HashSet::with_capacity(rows);
    (0..rows).all(|row| {
        let key: Vec<Option<&str>> = columns
            .iter()
            .map(|col| col.get(row).and_then(|v| v.as_deref()))
            .collect();
        seen.insert(key)
    })
}
