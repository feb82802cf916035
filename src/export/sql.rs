//! SQL exporter for generating CREATE TABLE and ALTER TABLE statements from
//! a normalized schema.
//!
//! # Identifiers
//!
//! Plain lowercase identifiers are written bare. Anything else (reserved
//! words, mixed case, spaces, punctuation) is quoted, with internal quote
//! characters escaped by doubling them.

use indexmap::IndexMap;

use crate::models::{ColumnSpec, CompositeKeyFallback, NormalizedSchema, SchemaKeys};

/// Comment prefix carrying a column's canonical name
pub const SUGGESTED_PREFIX: &str = "-- suggested: ";

const RESERVED_WORDS: &[&str] = &[
    "all", "alter", "and", "as", "by", "check", "column", "constraint", "create", "default",
    "delete", "distinct", "drop", "foreign", "from", "group", "having", "in", "index", "insert",
    "into", "is", "join", "key", "like", "limit", "not", "null", "on", "or", "order", "primary",
    "references", "select", "set", "table", "to", "union", "unique", "update", "user", "values",
    "where", "with",
];

/// Exporter for SQL DDL.
pub struct SQLExporter;

impl SQLExporter {
    /// Render one CREATE TABLE block.
    ///
    /// Columns keep the schema's order and carry an explicit `NULL` or
    /// `NOT NULL`. A canonical name that differs from the column name is
    /// written as a trailing `-- suggested:` comment after the separator.
    /// The PRIMARY KEY clause lists the selected key columns, or the
    /// composite fallback when no key is selected.
    ///
    /// # Example
    ///
    /// ```rust
    /// use indexmap::IndexMap;
    /// use schema_inference_sdk::export::sql::SQLExporter;
    /// use schema_inference_sdk::models::{ColumnSpec, SqlType};
    ///
    /// let mut columns = IndexMap::new();
    /// columns.insert("id".to_string(), ColumnSpec::new(SqlType::Int, false));
    ///
    /// let sql = SQLExporter::export_table("users", &columns, &["id"], None);
    /// assert_eq!(sql, "CREATE TABLE users (\n  id INT NOT NULL,\n  PRIMARY KEY (id)\n);");
    /// ```
    pub fn export_table(
        table: &str,
        columns: &IndexMap<String, ColumnSpec>,
        primary_key: &[&str],
        fallback: Option<&CompositeKeyFallback>,
    ) -> String {
        let key_columns: Vec<String> = if !primary_key.is_empty() {
            primary_key.iter().map(|c| Self::quote_identifier(c)).collect()
        } else {
            fallback
                .map(|f| f.columns.iter().map(|c| Self::quote_identifier(c)).collect())
                .unwrap_or_default()
        };

        let mut items: Vec<(String, Option<String>)> = columns
            .iter()
            .map(|(name, spec)| {
                let null = if spec.nullable { "NULL" } else { "NOT NULL" };
                let def = format!("{} {} {}", Self::quote_identifier(name), spec.sql_type, null);
                let comment = spec
                    .canonical_name
                    .as_ref()
                    .filter(|canonical| *canonical != name)
                    .map(|canonical| format!("{SUGGESTED_PREFIX}{canonical}"));
                (def, comment)
            })
            .collect();
        if !key_columns.is_empty() {
            items.push((format!("PRIMARY KEY ({})", key_columns.join(", ")), None));
        }

        let last = items.len().saturating_sub(1);
        let body: Vec<String> = items
            .into_iter()
            .enumerate()
            .map(|(i, (def, comment))| {
                let separator = if i < last { "," } else { "" };
                match comment {
                    Some(comment) => format!("  {def}{separator} {comment}"),
                    None => format!("  {def}{separator}"),
                }
            })
            .collect();

        format!(
            "CREATE TABLE {} (\n{}\n);",
            Self::quote_identifier(table),
            body.join("\n")
        )
    }

    /// Render the full DDL script: one CREATE TABLE block per table, then one
    /// ALTER TABLE per foreign key whose target table and column exist.
    /// Foreign keys pointing elsewhere are left out.
    pub fn export_schema(
        schema: &NormalizedSchema,
        keys: &SchemaKeys,
        fallbacks: &IndexMap<String, CompositeKeyFallback>,
    ) -> String {
        let mut blocks: Vec<String> = schema
            .tables
            .iter()
            .map(|(table, columns)| {
                Self::export_table(
                    table,
                    columns,
                    &keys.selected_primary_key(table),
                    fallbacks.get(table),
                )
            })
            .collect();

        let alters: Vec<String> = keys
            .foreign_keys
            .iter()
            .filter(|fk| schema.contains_column(&fk.target_table, &fk.target_column))
            .map(|fk| {
                format!(
                    "ALTER TABLE {} ADD FOREIGN KEY ({}) REFERENCES {} ({});",
                    Self::quote_identifier(&fk.source_table),
                    Self::quote_identifier(&fk.source_column),
                    Self::quote_identifier(&fk.target_table),
                    Self::quote_identifier(&fk.target_column),
                )
            })
            .collect();
        if !alters.is_empty() {
            blocks.push(alters.join("\n"));
        }

        if blocks.is_empty() {
            String::new()
        } else {
            format!("{}\n", blocks.join("\n\n"))
        }
    }

    /// Quote an identifier when it is not a plain lowercase word.
    ///
    /// ```rust
    /// use schema_inference_sdk::export::sql::SQLExporter;
    ///
    /// assert_eq!(SQLExporter::quote_identifier("orders"), "orders");
    /// assert_eq!(SQLExporter::quote_identifier("order"), "\"order\"");
    /// assert_eq!(SQLExporter::quote_identifier("my \"col\""), "\"my \"\"col\"\"\"");
    /// ```
    pub fn quote_identifier(identifier: &str) -> String {
        let plain = identifier
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
            && identifier
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if plain && !RESERVED_WORDS.contains(&identifier) {
            identifier.to_string()
        } else {
            format!("\"{}\"", identifier.replace('"', "\"\""))
        }
    }
}
