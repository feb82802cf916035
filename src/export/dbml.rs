//! DBML exporter

use crate::models::{NormalizedSchema, SchemaKeys};

/// Exporter for DBML table and reference definitions.
pub struct DBMLExporter;

impl DBMLExporter {
    pub fn export_schema(schema: &NormalizedSchema, keys: &SchemaKeys) -> String {
        let mut lines = Vec::new();

        for (table, columns) in &schema.tables {
            lines.push(format!("Table {} {{", table));
            let pk_columns: Vec<&str> = keys
                .primary_keys
                .get(table)
                .map(|pks| pks.iter().map(|pk| pk.column.as_str()).collect())
                .unwrap_or_default();
            for (name, spec) in columns {
                let tag = if pk_columns.contains(&name.as_str()) {
                    " [primary key]"
                } else if !spec.nullable {
                    " [not null]"
                } else {
                    ""
                };
                lines.push(format!("  {} {}{}", name, spec.sql_type, tag));
            }
            lines.push("}".to_string());
        }

        for fk in &keys.foreign_keys {
            lines.push(format!(
                "Ref: {}.{} > {}.{}",
                fk.source_table, fk.source_column, fk.target_table, fk.target_column
            ));
        }

        lines.join("\n")
    }
}
