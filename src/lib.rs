//! Schema Inference SDK - Relational schema inference from raw data files
//!
//! Provides unified interfaces for:
//! - File ingestion, cleaning and column profiling (CSV / JSON)
//! - Column type inference
//! - Primary, composite and foreign key detection
//! - Cross-table value matching and entity grouping
//! - Flat table decomposition
//! - DDL, Mermaid ERD and DBML export, plus DDL import
//! - Best-effort DDL rewriting through an external collaborator
//! - The end-to-end inference pipeline

pub mod decompose;
pub mod export;
pub mod grouping;
pub mod import;
pub mod inference;
pub mod ingest;
pub mod keys;
pub mod matching;
pub mod models;
pub mod overlap;
pub mod pipeline;
pub mod rewrite;
pub mod validation;

// Re-export commonly used types
pub use decompose::{EntityGrouping, decompose};
pub use export::{
    DBMLExporter, ExportError, ExportFormat, ExportResult, MermaidExporter, SQLExporter,
};
pub use grouping::{CanonicalGroup, ColumnGroup, EntityGrouper, GroupingConfig};
pub use import::{ImportError, ImportResult, SQLImporter};
pub use inference::infer_column_type;
pub use ingest::{IngestConfig, IngestError, LocalFileReader, RawTable, SourceReader};
pub use keys::{KeyConfig, RelationshipSuggester, find_composite_key};
pub use matching::{FuzzyConfig, FuzzyValueMatcher, ValueMatch};
pub use overlap::{TableOverlap, detect_overlapping_tables};
pub use pipeline::{
    InferenceOptions, InferenceResult, PipelineConfig, PipelineError, PipelineResult,
    SchemaPipeline,
};
pub use rewrite::{RewriteError, RewriteResult, SchemaRewriter};
#[cfg(feature = "llm-online")]
pub use rewrite::OllamaRewriter;
pub use validation::{DdlValidationError, validate_ddl};

// Re-export models
pub use models::{
    ColumnProfile, ColumnSpec, CompositeKeyFallback, ForeignKeyRef, MatchType, NormalizedSchema,
    RelationshipCandidate, SchemaKeys, SqlType, TableProfile,
};
