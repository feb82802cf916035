//! Emitter-facing schema types: the normalized column map and its keys

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::sql_type::SqlType;
use super::table::TableProfile;

/// Reason recorded for tables keyed by a composite fallback
pub const COMPOSITE_FALLBACK_REASON: &str =
    "No primary key detected. These columns together uniquely identify rows.";

/// One column as the renderers see it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(rename = "type")]
    pub sql_type: SqlType,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_name: Option<String>,
}

impl ColumnSpec {
    pub fn new(sql_type: SqlType, nullable: bool) -> Self {
        Self {
            sql_type,
            nullable,
            canonical_name: None,
        }
    }

    pub fn with_canonical_name(mut self, name: impl Into<String>) -> Self {
        self.canonical_name = Some(name.into());
        self
    }
}

/// Table name to ordered column map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedSchema {
    pub tables: IndexMap<String, IndexMap<String, ColumnSpec>>,
}

impl NormalizedSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from profiles; a column is nullable when its missing share
    /// exceeds `nullable_threshold`.
    pub fn from_profiles<'a>(
        profiles: impl IntoIterator<Item = &'a TableProfile>,
        nullable_threshold: f64,
    ) -> Self {
        let tables = profiles
            .into_iter()
            .map(|table| {
                let columns = table
                    .columns
                    .values()
                    .map(|col| {
                        let mut spec = ColumnSpec::new(
                            col.detected_type.clone(),
                            col.is_nullable(nullable_threshold),
                        );
                        spec.canonical_name = col.canonical_name.clone();
                        (col.name.clone(), spec)
                    })
                    .collect();
                (table.name.clone(), columns)
            })
            .collect();
        Self { tables }
    }

    pub fn insert_table(&mut self, name: impl Into<String>, columns: IndexMap<String, ColumnSpec>) {
        self.tables.insert(name.into(), columns);
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn contains_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .is_some_and(|cols| cols.contains_key(column))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyRef {
    pub column: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeyRef {
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

impl ForeignKeyRef {
    pub fn new(source: (&str, &str), target: (&str, &str)) -> Self {
        Self {
            source_table: source.0.to_string(),
            source_column: source.1.to_string(),
            target_table: target.0.to_string(),
            target_column: target.1.to_string(),
        }
    }
}

/// Selected keys for a normalized schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaKeys {
    pub primary_keys: IndexMap<String, Vec<PrimaryKeyRef>>,
    pub foreign_keys: Vec<ForeignKeyRef>,
}

impl SchemaKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_primary_key(&mut self, table: &str, column: &str) {
        let entries = self.primary_keys.entry(table.to_string()).or_default();
        if !entries.iter().any(|pk| pk.column == column) {
            entries.push(PrimaryKeyRef {
                column: column.to_string(),
                selected: true,
            });
        }
    }

    /// Selected primary key columns of `table`, in declaration order.
    pub fn selected_primary_key(&self, table: &str) -> Vec<&str> {
        self.primary_keys
            .get(table)
            .map(|pks| {
                pks.iter()
                    .filter(|pk| pk.selected)
                    .map(|pk| pk.column.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_foreign_key_source(&self, table: &str, column: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.source_table == table && fk.source_column == column)
    }
}

/// Multi-column key used when a table has no single-column primary key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeKeyFallback {
    pub columns: Vec<String>,
    pub reason: String,
}

impl CompositeKeyFallback {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            reason: COMPOSITE_FALLBACK_REASON.to_string(),
        }
    }
}
