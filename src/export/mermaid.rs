//! Mermaid ER diagram exporter

use crate::models::{NormalizedSchema, SchemaKeys};

/// Exporter for Mermaid `erDiagram` text.
pub struct MermaidExporter;

impl MermaidExporter {
    /// Render one entity block per table followed by one one-to-many
    /// relationship line per foreign key.
    ///
    /// Attributes are written as base type, column name and an optional
    /// `PK` or `FK` role.
    pub fn export_schema(schema: &NormalizedSchema, keys: &SchemaKeys) -> String {
        let mut lines = vec!["erDiagram".to_string()];

        for (table, columns) in &schema.tables {
            lines.push(format!("    {} {{", table));
            for (name, spec) in columns {
                let base_type = spec
                    .sql_type
                    .base_name()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join("_");
                let is_pk = keys
                    .primary_keys
                    .get(table)
                    .is_some_and(|pks| pks.iter().any(|pk| &pk.column == name));
                let role = if is_pk {
                    " PK"
                } else if keys.is_foreign_key_source(table, name) {
                    " FK"
                } else {
                    ""
                };
                lines.push(format!("        {} {}{}", base_type, name, role));
            }
            lines.push("    }".to_string());
        }

        for fk in &keys.foreign_keys {
            lines.push(format!(
                "    {} ||--o{{ {} : has",
                fk.target_table, fk.source_table
            ));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnSpec, ForeignKeyRef, SqlType};
    use indexmap::IndexMap;

    #[test]
    fn test_entities_and_relationships() {
        let mut schema = NormalizedSchema::new();
        let mut customers = IndexMap::new();
        customers.insert("id".to_string(), ColumnSpec::new(SqlType::Int, false));
        customers.insert("name".to_string(), ColumnSpec::new(SqlType::Varchar(20), true));
        schema.insert_table("customers", customers);
        let mut orders = IndexMap::new();
        orders.insert("customer_id".to_string(), ColumnSpec::new(SqlType::Int, false));
        schema.insert_table("orders", orders);

        let mut keys = SchemaKeys::new();
        keys.add_primary_key("customers", "id");
        keys.foreign_keys
            .push(ForeignKeyRef::new(("orders", "customer_id"), ("customers", "id")));

        let text = MermaidExporter::export_schema(&schema, &keys);
        assert_eq!(
            text,
            "erDiagram\n    customers {\n        INT id PK\n        VARCHAR name\n    }\n    orders {\n        INT customer_id FK\n    }\n    customers ||--o{ orders : has"
        );
    }
}
