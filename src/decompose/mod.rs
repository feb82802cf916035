//! Flat-table decomposition
//!
//! Splits a single flat table into one table per entity grouping plus a
//! residual base table that references each entity through foreign-key
//! columns named `{entity}_{pk}`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::grouping::{CanonicalGroup, local_name};
use crate::models::{ColumnProfile, TableProfile};

/// Columns of a flat table that belong to one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityGrouping {
    pub entity_name: String,
    /// Column references, either `table.column` or bare names
    pub columns: Vec<String>,
    /// Subset of `columns` (bare names) forming the entity's key
    #[serde(default)]
    pub primary_key: Vec<String>,
}

impl EntityGrouping {
    pub fn new<I, S>(entity_name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entity_name: entity_name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            primary_key: Vec::new(),
        }
    }

    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Grouping for an automatically named group. The first member that is
    /// fully unique in `table` becomes the key.
    pub fn from_canonical(group: &CanonicalGroup, table: &TableProfile) -> Self {
        let primary_key = group
            .columns
            .iter()
            .map(|c| local_name(c))
            .find(|c| table.column(c).is_some_and(ColumnProfile::is_fully_unique))
            .map(|c| vec![c.to_string()])
            .unwrap_or_default();
        Self {
            entity_name: group.entity_name.clone(),
            columns: group.columns.clone(),
            primary_key,
        }
    }
}

/// Decompose `table` along `groupings`.
///
/// Entity tables come first in grouping order, followed by the residual
/// table under the original name when any column remains. A grouping is
/// skipped when it has no name, reuses the base table's name or an earlier
/// entity's name, declares a key outside its own columns, or resolves to no
/// unclaimed column.
pub fn decompose(table: &TableProfile, groupings: &[EntityGrouping]) -> Vec<TableProfile> {
    let mut claimed: HashSet<String> = HashSet::new();
    let mut entity_names: HashSet<&str> = HashSet::new();
    let mut entities: Vec<TableProfile> = Vec::new();
    let mut foreign_keys: Vec<ColumnProfile> = Vec::new();

    for grouping in groupings {
        let entity = grouping.entity_name.trim();
        if entity.is_empty() || entity == table.name || entity_names.contains(entity) {
            debug!(entity = %grouping.entity_name, "Skipping entity grouping");
            continue;
        }

        let members: Vec<&str> = grouping.columns.iter().map(|c| local_name(c)).collect();
        if !grouping.primary_key.iter().all(|pk| members.contains(&pk.as_str())) {
            debug!(entity, "Primary key outside grouping columns, skipping");
            continue;
        }

        let mut entity_table = TableProfile::new(entity).with_source_path(&table.source_path);
        for name in &members {
            if claimed.contains(*name) {
                continue;
            }
            if let Some(column) = table.column(name) {
                let mut column = column.clone();
                column.is_primary_key = grouping.primary_key.iter().any(|pk| pk == name);
                entity_table.insert_column(column);
            }
        }
        if entity_table.is_empty() {
            continue;
        }

        claimed.extend(entity_table.column_names().map(String::from));
        for pk in &grouping.primary_key {
            let Some(original) = entity_table.column(pk) else {
                continue;
            };
            let mut fk = original.clone();
            fk.name = format!("{}_{}", entity, pk);
            fk.is_primary_key = false;
            fk.canonical_name = None;
            fk.is_foreign_key_to = Some(format!("{}.{}", entity, pk));
            foreign_keys.push(fk);
        }
        entity_names.insert(entity);
        entities.push(entity_table);
    }

    let mut residual = TableProfile::new(&table.name).with_source_path(&table.source_path);
    for column in table.columns.values() {
        if !claimed.contains(&column.name) {
            residual.insert_column(column.clone());
        }
    }
    for fk in foreign_keys {
        if residual.column(&fk.name).is_none() {
            residual.insert_column(fk);
        }
    }

    info!(
        table = %table.name,
        entities = entities.len(),
        residual_columns = residual.columns.len(),
        "Decomposed flat table"
    );

    if !residual.is_empty() {
        entities.push(residual);
    }
    entities
}
