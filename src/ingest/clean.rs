//! Table cleaning: header sanitizing, null normalization, sparse pruning

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::config::IngestConfig;
use super::error::{IngestError, IngestResult};
use super::frame::RawTable;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").unwrap());
static UNNAMED_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^unnamed").unwrap());

/// Lowercase a header and collapse runs of non-word characters into `_`.
pub fn sanitize_column_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    NON_WORD
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Table name from a file stem: lowercase, non-word characters become `_`,
/// and a leading digit gets a `_` prefix.
pub fn sanitize_table_name(stem: &str) -> String {
    let lowered = stem.trim().to_lowercase();
    let mut name: String = lowered
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if name.is_empty() {
        name.push_str("table");
    }
    name
}

/// Clean a freshly parsed table.
///
/// Drops unnamed headers, sanitizes and de-duplicates column names, trims
/// cells, maps null tokens to absent, then drops empty rows, empty columns
/// and columns sparser than the configured ratio.
pub fn clean_table(raw: RawTable, config: &IngestConfig) -> IngestResult<RawTable> {
    let (name, columns, rows) = raw.take_columns();

    let mut cleaned: IndexMap<String, Vec<Option<String>>> = IndexMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    for (header, values) in columns {
        if header.trim().is_empty() || UNNAMED_HEADER.is_match(header.trim()) {
            debug!(table = %name, column = %header, "Dropping unnamed column");
            continue;
        }
        let base = sanitize_column_name(&header);
        if base.is_empty() {
            debug!(table = %name, column = %header, "Dropping column with empty sanitized name");
            continue;
        }
        let unique = unique_name(&base, &taken);
        taken.insert(unique.clone());

        let values = values
            .into_iter()
            .map(|cell| {
                cell.and_then(|v| {
                    let trimmed = v.trim();
                    (!config.is_null_token(trimmed)).then(|| trimmed.to_string())
                })
            })
            .collect();
        cleaned.insert(unique, values);
    }

    if cleaned.is_empty() {
        return Err(IngestError::Cleaning("no named columns".to_string()));
    }

    let mut table = RawTable::from_parts(name, cleaned, rows);

    let populated: Vec<bool> = (0..table.row_count())
        .map(|r| table.columns().any(|(_, values)| values[r].is_some()))
        .collect();
    table.retain_rows(|r| populated[r]);

    let rows = table.row_count();
    let max_ratio = config.sparse_column_ratio;
    table.retain_columns(|name, values| {
        let missing = values.iter().filter(|v| v.is_none()).count();
        if rows == 0 || missing == rows {
            return false;
        }
        let ratio = missing as f64 / rows as f64;
        if ratio > max_ratio {
            debug!(column = %name, missing_ratio = ratio, "Dropping sparse column");
            return false;
        }
        true
    });

    if table.is_empty() {
        return Err(IngestError::Empty);
    }
    Ok(table)
}

fn unique_name(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}
