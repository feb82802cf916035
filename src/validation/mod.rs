//! Validation functionality
//!
//! Provides DDL syntax validation backed by `sqlparser`.

pub mod sql;

pub use sql::{DdlValidationError, validate_ddl, validate_ddl_lenient};
