//! Column type inference over a bounded value sample

use once_cell::sync::Lazy;
use regex::Regex;

use super::formats::parses_as_date;
use crate::models::SqlType;

/// Literals accepted as booleans after trimming and lowercasing
pub const BOOLEAN_LITERALS: &[&str] = &["true", "false", "yes", "no", "1", "0"];

/// Rounded VARCHAR lengths at or above this become TEXT
pub const MAX_VARCHAR_LENGTH: u32 = 255;

/// Slack added to the longest sample before rounding
const VARCHAR_PADDING: usize = 10;

static INT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+$").unwrap());
static NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+(\.\d+)?$").unwrap());
static DECIMAL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d+\.\d+$").unwrap());

/// Infer a SQL type from sample values.
///
/// Rules are evaluated over the whole sample in a fixed order, first match
/// wins: BOOLEAN, INT, FLOAT (at least one real decimal), DATE, then
/// VARCHAR(n) with `n` the longest value plus ten rounded up to a multiple
/// of ten, or TEXT once that reaches 255. An empty sample is TEXT.
///
/// # Example
///
/// ```rust
/// use schema_inference_sdk::inference::infer_column_type;
/// use schema_inference_sdk::models::SqlType;
///
/// assert_eq!(infer_column_type(&["0", "1"]), SqlType::Boolean);
/// assert_eq!(infer_column_type(&["10", "200"]), SqlType::Int);
/// assert_eq!(infer_column_type(&["alice"]), SqlType::Varchar(20));
/// ```
pub fn infer_column_type<S: AsRef<str>>(values: &[S]) -> SqlType {
    if values.is_empty() {
        return SqlType::Text;
    }

    let normalized: Vec<String> = values
        .iter()
        .map(|v| v.as_ref().trim().to_lowercase())
        .collect();

    if normalized
        .iter()
        .all(|v| BOOLEAN_LITERALS.contains(&v.as_str()))
    {
        return SqlType::Boolean;
    }

    if normalized.iter().all(|v| INT_REGEX.is_match(v)) {
        return SqlType::Int;
    }

    if normalized.iter().all(|v| NUMBER_REGEX.is_match(v))
        && normalized.iter().any(|v| DECIMAL_REGEX.is_match(v))
    {
        return SqlType::Float;
    }

    if normalized.iter().all(|v| parses_as_date(v)) {
        return SqlType::Date;
    }

    let max_len = values
        .iter()
        .map(|v| v.as_ref().chars().count())
        .max()
        .unwrap_or(0);
    varchar_or_text(max_len)
}

fn varchar_or_text(max_len: usize) -> SqlType {
    let rounded = (max_len + VARCHAR_PADDING).div_ceil(10) * 10;
    match u32::try_from(rounded) {
        Ok(len) if len < MAX_VARCHAR_LENGTH => SqlType::Varchar(len),
        _ => SqlType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_wins_over_int() {
        assert_eq!(infer_column_type(&["1", "0", "1"]), SqlType::Boolean);
        assert_eq!(infer_column_type(&["Yes", " no ", "TRUE"]), SqlType::Boolean);
    }

    #[test]
    fn test_int_and_float() {
        assert_eq!(infer_column_type(&["1", "2", "-3"]), SqlType::Int);
        assert_eq!(infer_column_type(&["1", "2.5"]), SqlType::Float);
        assert_eq!(infer_column_type(&["1.5", "abc", "2.5"]), SqlType::Varchar(20));
    }

    #[test]
    fn test_date() {
        assert_eq!(
            infer_column_type(&["2024-01-01", "2023-12-31"]),
            SqlType::Date
        );
    }

    #[test]
    fn test_varchar_rounding() {
        // 5 chars + 10 = 15 -> 20
        assert_eq!(infer_column_type(&["hello"]), SqlType::Varchar(20));
        // 10 chars + 10 = 20 -> 20
        assert_eq!(infer_column_type(&["abcdefghij"]), SqlType::Varchar(20));
        let long = "x".repeat(240);
        assert_eq!(infer_column_type(&[long.as_str()]), SqlType::Varchar(250));
        let longer = "x".repeat(241);
        assert_eq!(infer_column_type(&[longer.as_str()]), SqlType::Text);
    }

    #[test]
    fn test_empty_sample_is_text() {
        assert_eq!(infer_column_type::<&str>(&[]), SqlType::Text);
    }
}
