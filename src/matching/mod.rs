//! Value-level matching across tables
//!
//! Provides the normalization pipeline, the shared column cache and the
//! concurrent [`FuzzyValueMatcher`] that feeds entity grouping.

pub mod cache;
pub mod config;
pub mod error;
pub mod matcher;
pub mod normalize;

pub use cache::ColumnCache;
pub use config::FuzzyConfig;
pub use error::{MatchError, MatchResult};
pub use matcher::{FuzzyValueMatcher, ValueMatch};
pub use normalize::{normalize_value, partial_ratio};
