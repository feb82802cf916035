//! Export functionality
//!
//! Renders a normalized schema and its keys to:
//! - SQL DDL (CREATE TABLE + ALTER TABLE ... ADD FOREIGN KEY)
//! - Mermaid ER diagrams
//! - DBML

pub mod dbml;
pub mod mermaid;
pub mod sql;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::models::{CompositeKeyFallback, NormalizedSchema, SchemaKeys};

/// Result of an export operation
#[derive(Debug, Clone, PartialEq)]
pub struct ExportResult {
    /// Rendered text
    pub content: String,
    /// Format identifier
    pub format: String,
}

/// Error during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
}

/// Text formats a schema can be rendered to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Sql,
    Mermaid,
    Dbml,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Sql => "sql",
            ExportFormat::Mermaid => "mermaid",
            ExportFormat::Dbml => "dbml",
        };
        f.write_str(name)
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sql" | "ddl" => Ok(ExportFormat::Sql),
            "mermaid" | "erd" => Ok(ExportFormat::Mermaid),
            "dbml" => Ok(ExportFormat::Dbml),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Render `schema` and `keys` in the requested format.
pub fn render(
    format: ExportFormat,
    schema: &NormalizedSchema,
    keys: &SchemaKeys,
    fallbacks: &IndexMap<String, CompositeKeyFallback>,
) -> ExportResult {
    let content = match format {
        ExportFormat::Sql => SQLExporter::export_schema(schema, keys, fallbacks),
        ExportFormat::Mermaid => MermaidExporter::export_schema(schema, keys),
        ExportFormat::Dbml => DBMLExporter::export_schema(schema, keys),
    };
    ExportResult {
        content,
        format: format.to_string(),
    }
}

// Re-export for convenience
pub use dbml::DBMLExporter;
pub use mermaid::MermaidExporter;
pub use sql::SQLExporter;
