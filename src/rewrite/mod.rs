//! Best-effort DDL rewriting through an external collaborator
//!
//! A [`SchemaRewriter`] takes the generated DDL plus a dialect hint and
//! returns revised DDL. The result is only accepted when it parses; any
//! failure keeps the original DDL and produces a warning instead.

pub mod error;
#[cfg(feature = "llm-online")]
pub mod ollama;
pub mod prompt;

pub use error::{RewriteError, RewriteResult};
#[cfg(feature = "llm-online")]
pub use ollama::OllamaRewriter;
pub use prompt::{build_prompt, dialect_requirements, extract_ddl};

use tracing::{info, warn};

use crate::validation::validate_ddl_lenient;

/// External DDL rewriting collaborator
pub trait SchemaRewriter: Send + Sync {
    /// Rewrite `ddl` for `dialect`, returning the revised DDL text.
    fn rewrite(&self, ddl: &str, dialect: &str) -> RewriteResult<String>;

    /// Name used in log output.
    fn name(&self) -> &str {
        "rewriter"
    }
}

/// Run `rewriter` over `ddl`, keeping the original text on any failure.
///
/// Returns the DDL to publish and, when the rewrite was not applied, a
/// warning describing why.
pub fn apply_rewrite(
    rewriter: Option<&dyn SchemaRewriter>,
    ddl: &str,
    dialect: &str,
) -> (String, Option<String>) {
    match try_rewrite(rewriter, ddl, dialect) {
        Ok(revised) => {
            info!(dialect, bytes = revised.len(), "Accepted rewritten DDL");
            (revised, None)
        }
        Err(err) => {
            warn!(dialect, error = %err, "Rewrite failed, keeping generated DDL");
            (
                ddl.to_string(),
                Some(format!("DDL rewrite skipped: {err}")),
            )
        }
    }
}

fn try_rewrite(
    rewriter: Option<&dyn SchemaRewriter>,
    ddl: &str,
    dialect: &str,
) -> RewriteResult<String> {
    let rewriter = rewriter.ok_or(RewriteError::NotConfigured)?;
    if dialect_requirements(dialect).is_none() {
        return Err(RewriteError::UnsupportedDialect(dialect.to_string()));
    }
    let revised = rewriter.rewrite(ddl, dialect)?;
    let revised = revised.trim();
    if revised.is_empty() {
        return Err(RewriteError::MissingDdl);
    }
    validate_ddl_lenient(revised, dialect)
        .map_err(|e| RewriteError::ValidationError(e.to_string()))?;
    Ok(format!("{revised}\n"))
}
