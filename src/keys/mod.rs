//! Key detection
//!
//! Primary key ranking, composite key search and foreign key suggestion.

pub mod composite;
pub mod config;
pub mod suggester;

pub use composite::{DEFAULT_MAX_KEY_COLUMNS, find_composite_key};
pub use config::KeyConfig;
pub use suggester::{
    DiscoveredPatterns, KeyAnalysis, PrimaryKeyCandidate, RelationshipSuggester,
    deduplicate_by_confidence,
};
