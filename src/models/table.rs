//! Table profile model

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::column::ColumnProfile;

/// Profile of one ingested table. Column order follows the source file and
/// drives the column order of every generated artifact.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TableProfile {
    pub name: String,
    pub columns: IndexMap<String, ColumnProfile>,
    /// Origin of the data, empty for derived tables
    #[serde(default)]
    pub source_path: String,
}

impl TableProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: IndexMap::new(),
            source_path: String::new(),
        }
    }

    pub fn with_source_path(mut self, path: impl Into<String>) -> Self {
        self.source_path = path.into();
        self
    }

    /// Append a column, replacing any column with the same name in place.
    pub fn with_column(mut self, column: ColumnProfile) -> Self {
        self.insert_column(column);
        self
    }

    pub fn insert_column(&mut self, column: ColumnProfile) {
        self.columns.insert(column.name.clone(), column);
    }

    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.get(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Columns currently flagged as primary key, in column order.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.columns
            .values()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SqlType;

    #[test]
    fn test_column_order_is_preserved() {
        let table = TableProfile::new("orders")
            .with_column(ColumnProfile::new("z", SqlType::Int, 1.0, 0.0, vec![]))
            .with_column(ColumnProfile::new("a", SqlType::Text, 0.5, 0.0, vec![]));
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["z", "a"]);
    }

    #[test]
    fn test_primary_key_columns() {
        let mut id = ColumnProfile::new("id", SqlType::Int, 1.0, 0.0, vec![]);
        id.is_primary_key = true;
        let table = TableProfile::new("t")
            .with_column(ColumnProfile::new("name", SqlType::Text, 0.9, 0.0, vec![]))
            .with_column(id);
        assert_eq!(table.primary_key_columns(), vec!["id"]);
    }
}
