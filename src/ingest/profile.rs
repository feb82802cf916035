//! Column profiling

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::config::IngestConfig;
use super::frame::RawTable;
use crate::inference::{detect_common_format, infer_column_type};
use crate::models::{ColumnProfile, TableProfile};

/// Names of index/placeholder columns that never carry meaning
static PLACEHOLDER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(index|unnamed(_?\d+)?|(col|column)_?\d+)$").unwrap());

/// Deterministic evenly spaced sample of at most `size` values.
pub fn even_sample<T: Clone>(values: &[T], size: usize) -> Vec<T> {
    let len = values.len();
    if len <= size {
        return values.to_vec();
    }
    (0..size).map(|i| values[i * len / size].clone()).collect()
}

/// Profile every meaningful column of a cleaned table.
///
/// Placeholder-named, all-absent and constant columns are skipped.
pub fn profile_table(table: &RawTable, config: &IngestConfig) -> TableProfile {
    let mut profile = TableProfile::new(table.name.clone());
    let rows = table.row_count();

    for (name, values) in table.columns() {
        let lowered = name.trim().to_lowercase();
        if lowered.is_empty() || PLACEHOLDER_NAME.is_match(&lowered) {
            debug!(table = %table.name, column = %name, "Skipping placeholder column");
            continue;
        }

        let present: Vec<&str> = values.iter().filter_map(|v| v.as_deref()).collect();
        if present.is_empty() {
            debug!(table = %table.name, column = %name, "Skipping empty column");
            continue;
        }

        let distinct: HashSet<&str> = present.iter().copied().collect();
        if distinct.len() <= 1 {
            debug!(table = %table.name, column = %name, "Skipping constant column");
            continue;
        }

        let sample: Vec<String> = even_sample(&present, config.sample_size)
            .into_iter()
            .map(str::to_string)
            .collect();
        let unique_ratio = distinct.len() as f64 / present.len() as f64;
        let null_percent = if rows == 0 {
            0.0
        } else {
            (rows - present.len()) as f64 / rows as f64
        };

        let detected_type = infer_column_type(&sample);
        let mut column = ColumnProfile::new(name, detected_type, unique_ratio, null_percent, sample);
        if config.detect_formats
            && let Some(format) = detect_common_format(&column.sample_values)
        {
            column = column.with_semantic_type(format.to_string());
        }
        profile.insert_column(column);
    }

    debug!(table = %table.name, columns = profile.columns.len(), rows, "Table profiled");
    profile
}
