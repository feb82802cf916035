//! Format detection for string values
//!
//! Two concerns live here: the permissive date check the type inferencer
//! needs, and the semantic format tag (`email`, `uuid`, ...) stamped onto
//! column profiles.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Detected value format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Date,
    DateTime,
    Email,
    Uri,
    Uuid,
    Ipv4,
    Phone,
    None,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Date => write!(f, "date"),
            Format::DateTime => write!(f, "date-time"),
            Format::Email => write!(f, "email"),
            Format::Uri => write!(f, "uri"),
            Format::Uuid => write!(f, "uuid"),
            Format::Ipv4 => write!(f, "ipv4"),
            Format::Phone => write!(f, "phone"),
            Format::None => write!(f, "none"),
        }
    }
}

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static URI_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?|ftp|file)://[^\s/$.?#].[^\s]*$").unwrap());

static IPV4_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
    .unwrap()
});

// Requires a leading '+' so plain integers are not tagged as phone numbers
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+[1-9]\d{6,14}$").unwrap());

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%B %d, %Y",
    "%Y-%b-%d",
    "%d-%b-%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M",
];

fn parse_date_only(value: &str) -> bool {
    DATE_FORMATS
        .iter()
        .any(|fmt| NaiveDate::parse_from_str(value, fmt).is_ok())
}

fn parse_date_time(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || DateTime::parse_from_rfc2822(value).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok())
}

/// Whether `value` reads as a calendar date or timestamp under any of the
/// accepted layouts (ISO, day-first, month-first, named months, RFC 3339/2822).
pub fn parses_as_date(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    parse_date_only(value) || parse_date_time(value)
}

/// Detect the format of a single string value
pub fn detect_format(value: &str) -> Format {
    let value = value.trim();
    if value.is_empty() {
        return Format::None;
    }

    if UUID_REGEX.is_match(value) {
        return Format::Uuid;
    }
    if EMAIL_REGEX.is_match(value) {
        return Format::Email;
    }
    if URI_REGEX.is_match(value) {
        return Format::Uri;
    }
    if IPV4_REGEX.is_match(value) {
        return Format::Ipv4;
    }
    if PHONE_REGEX.is_match(value) {
        return Format::Phone;
    }
    if parse_date_only(value) {
        return Format::Date;
    }
    if parse_date_time(value) {
        return Format::DateTime;
    }

    Format::None
}

/// The format shared by every value of a sample, if any.
pub fn detect_common_format<S: AsRef<str>>(values: &[S]) -> Option<Format> {
    let mut formats = values.iter().map(|v| detect_format(v.as_ref()));
    let first = formats.next()?;
    if first == Format::None {
        return None;
    }
    formats.all(|f| f == first).then_some(first)
}
