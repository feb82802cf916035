//! Column type inference
//!
//! Infers SQL type tags from small value samples and detects semantic value
//! formats (email, uuid, uri, ...) for column profiles.

pub mod formats;
pub mod types;

pub use formats::{Format, detect_common_format, detect_format, parses_as_date};
pub use types::{BOOLEAN_LITERALS, MAX_VARCHAR_LENGTH, infer_column_type};
