//! SQL type tags produced by type inference

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Column type tag carried through profiling, key ranking and DDL emission.
///
/// Serialized as its DDL spelling (`"INT"`, `"VARCHAR(30)"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SqlType {
    Boolean,
    Int,
    Float,
    Date,
    /// Bounded text, length already rounded up to a multiple of ten
    Varchar(u32),
    Text,
    /// Any other type name read back from DDL (`BIGINT`, `UUID`, `CHAR(2)`, ...)
    Other(String),
}

impl SqlType {
    /// Type name without any length suffix, e.g. `VARCHAR` for `VARCHAR(30)`.
    pub fn base_name(&self) -> &str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::Int => "INT",
            SqlType::Float => "FLOAT",
            SqlType::Date => "DATE",
            SqlType::Varchar(_) => "VARCHAR",
            SqlType::Text => "TEXT",
            SqlType::Other(raw) => raw.split('(').next().unwrap_or(raw).trim(),
        }
    }

    /// True for the character types the value matcher compares.
    pub fn is_textual(&self) -> bool {
        matches!(self.base_name(), "VARCHAR" | "TEXT" | "CHAR")
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Varchar(len) => write!(f, "VARCHAR({len})"),
            SqlType::Other(raw) => write!(f, "{raw}"),
            other => write!(f, "{}", other.base_name()),
        }
    }
}

impl FromStr for SqlType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spaced = s.split_whitespace().collect::<Vec<_>>().join(" ");
        if spaced.is_empty() {
            return Err("empty type name".to_string());
        }
        // "VARCHAR ( 30 )" and "VARCHAR(30)" spell the same type
        let upper = spaced
            .replace(" (", "(")
            .replace("( ", "(")
            .replace(" )", ")")
            .to_uppercase();

        match upper.as_str() {
            "BOOLEAN" | "BOOL" => return Ok(SqlType::Boolean),
            "INT" | "INTEGER" => return Ok(SqlType::Int),
            "FLOAT" => return Ok(SqlType::Float),
            "DATE" => return Ok(SqlType::Date),
            "TEXT" => return Ok(SqlType::Text),
            _ => {}
        }

        if let Some(len) = upper
            .strip_prefix("VARCHAR(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return len
                .parse::<u32>()
                .map(SqlType::Varchar)
                .map_err(|e| format!("invalid VARCHAR length '{len}': {e}"));
        }

        Ok(SqlType::Other(upper))
    }
}

impl TryFrom<String> for SqlType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SqlType> for String {
    fn from(value: SqlType) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        assert_eq!(SqlType::Varchar(30).to_string(), "VARCHAR(30)");
        assert_eq!("varchar( 30 )".parse::<SqlType>().unwrap(), SqlType::Varchar(30));
        assert_eq!("integer".parse::<SqlType>().unwrap(), SqlType::Int);
        assert_eq!(
            "bigint".parse::<SqlType>().unwrap(),
            SqlType::Other("BIGINT".to_string())
        );
        assert!("".parse::<SqlType>().is_err());
    }

    #[test]
    fn test_multi_word_types_keep_their_spacing() {
        assert_eq!(
            "DOUBLE PRECISION".parse::<SqlType>().unwrap(),
            SqlType::Other("DOUBLE PRECISION".to_string())
        );
        assert_eq!(
            "double \t  precision".parse::<SqlType>().unwrap(),
            SqlType::Other("DOUBLE PRECISION".to_string())
        );
        assert_eq!(
            "timestamp with time zone".parse::<SqlType>().unwrap().to_string(),
            "TIMESTAMP WITH TIME ZONE"
        );
        assert_eq!("VARCHAR ( 30 )".parse::<SqlType>().unwrap(), SqlType::Varchar(30));
        assert_eq!(" varchar(30) ".parse::<SqlType>().unwrap(), SqlType::Varchar(30));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(SqlType::Varchar(10).base_name(), "VARCHAR");
        assert_eq!(SqlType::Other("CHAR(2)".to_string()).base_name(), "CHAR");
        assert!(SqlType::Other("CHAR(2)".to_string()).is_textual());
        assert!(!SqlType::Int.is_textual());
    }

    #[test]
    fn test_serde_uses_ddl_spelling() {
        let json = serde_json::to_string(&SqlType::Varchar(20)).unwrap();
        assert_eq!(json, "\"VARCHAR(20)\"");
        let back: SqlType = serde_json::from_str("\"TEXT\"").unwrap();
        assert_eq!(back, SqlType::Text);
    }
}
