//! Inference pipeline
//!
//! Orchestrates ingestion, key detection, value matching, entity grouping,
//! decomposition and rendering for one set of uploaded files:
//!
//! 1. **Ingest**: read, clean and profile each file; unusable files are rejected
//! 2. **Keys**: select primary keys, search composite keys where none exists
//! 3. **Relationships**: suggest foreign keys and report table overlaps
//! 4. **Entities**: match values across tables, group and name columns
//! 5. **Decompose**: split a single flat table into entity tables
//! 6. **Render**: emit DDL, Mermaid and DBML, optionally rewrite the DDL
//!
//! ```rust,no_run
//! use schema_inference_sdk::pipeline::{InferenceOptions, SchemaPipeline};
//!
//! let pipeline = SchemaPipeline::default();
//! let result = pipeline.infer(&["customers.csv", "orders.csv"], &InferenceOptions::default());
//! println!("{}", result.sql);
//! ```

pub mod config;
pub mod error;
pub mod result;
pub mod runner;

pub use config::{InferenceOptions, PipelineConfig};
pub use error::{PipelineError, PipelineResult};
pub use result::InferenceResult;
pub use runner::{SchemaPipeline, resolve_foreign_keys};
