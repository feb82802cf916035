//! Models module for the SDK
//!
//! Defines the profile, relationship and schema types that flow between
//! the inference stages and the renderers.

pub mod column;
pub mod relationship;
pub mod schema;
pub mod sql_type;
pub mod table;

pub use column::ColumnProfile;
pub use relationship::{MatchType, RelationshipCandidate};
pub use schema::{
    COMPOSITE_FALLBACK_REASON, ColumnSpec, CompositeKeyFallback, ForeignKeyRef, NormalizedSchema,
    PrimaryKeyRef, SchemaKeys,
};
pub use sql_type::SqlType;
pub use table::TableProfile;
