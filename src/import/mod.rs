//! Import functionality
//!
//! Reads DDL produced by [`SQLExporter`](crate::export::SQLExporter) back
//! into a normalized schema and its keys, so diagrams can be regenerated
//! from edited DDL.

pub mod sql;

use crate::models::{NormalizedSchema, SchemaKeys};

/// Result of an import operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportResult {
    /// Tables and columns in statement order
    pub schema: NormalizedSchema,
    /// Primary keys from PRIMARY KEY clauses, foreign keys from FOREIGN KEY
    /// clauses and ALTER TABLE statements
    pub keys: SchemaKeys,
    /// Parse errors/warnings for statements or items that were skipped
    pub errors: Vec<ImportError>,
}

/// Error during import
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}

// Re-export for convenience
pub use sql::SQLImporter;
