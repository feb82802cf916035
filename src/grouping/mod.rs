//! Entity grouping
//!
//! Clusters fuzzy-matched columns into entity groups and names them.

pub mod config;
pub mod grouper;
pub mod naming;

pub use config::GroupingConfig;
pub use grouper::{ColumnGroup, EntityGrouper, group_by_leading_token, merge_overlapping};
pub use naming::{CanonicalGroup, canonical_name, local_name, suggest_canonical_names};
