//! DDL syntax validation

use sqlparser::dialect::{GenericDialect, dialect_from_str};
use sqlparser::parser::Parser;

/// Error returned when DDL fails to parse
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DdlValidationError {
    #[error("Unknown SQL dialect: {0}")]
    UnknownDialect(String),
    #[error("SQL validation failed: {0}")]
    Syntax(String),
}

/// Check `sql` parses under `dialect` (`postgres`, `mysql`, `sqlite`,
/// `mssql`, `generic`, ...). Returns the number of statements.
///
/// # Example
///
/// ```rust
/// use schema_inference_sdk::validation::validate_ddl;
///
/// assert_eq!(validate_ddl("CREATE TABLE t (id INT NOT NULL);", "postgres"), Ok(1));
/// assert!(validate_ddl("CREATE TABLE (", "postgres").is_err());
/// ```
pub fn validate_ddl(sql: &str, dialect: &str) -> Result<usize, DdlValidationError> {
    let name = match dialect.trim().to_lowercase().as_str() {
        "sqlserver" => "mssql".to_string(),
        "postgresql" => "postgres".to_string(),
        other => other.to_string(),
    };
    let dialect =
        dialect_from_str(&name).ok_or_else(|| DdlValidationError::UnknownDialect(name.clone()))?;
    Parser::parse_sql(&*dialect, sql)
        .map(|statements| statements.len())
        .map_err(|e| DdlValidationError::Syntax(e.to_string()))
}

/// Like [`validate_ddl`], but parses with the generic dialect when
/// `dialect` has no dedicated parser (e.g. `oracle`).
pub fn validate_ddl_lenient(sql: &str, dialect: &str) -> Result<usize, DdlValidationError> {
    match validate_ddl(sql, dialect) {
        Err(DdlValidationError::UnknownDialect(_)) => Parser::parse_sql(&GenericDialect {}, sql)
            .map(|statements| statements.len())
            .map_err(|e| DdlValidationError::Syntax(e.to_string())),
        other => other,
    }
}
