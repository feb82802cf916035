//! Output formatting for CLI

use std::path::Path;

use schema_inference_sdk::import::ImportError;
use schema_inference_sdk::pipeline::InferenceResult;

use crate::error::CliError;

/// Write `content` to `path`, or stdout when no path is given
pub fn write_output(content: &str, path: Option<&Path>) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, content)
            .map_err(|e| CliError::FileWriteError(path.to_path_buf(), e.to_string())),
        None => {
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

/// Human-readable run summary for stderr
pub fn format_summary(result: &InferenceResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Profiled {} of {} file(s): {}\n",
        result.tables.len(),
        result.filenames.len(),
        result.tables.join(", ")
    ));

    if !result.rejected_files.is_empty() {
        output.push_str("\nRejected files:\n");
        for (file, reason) in &result.rejected_files {
            output.push_str(&format!("  - {file}: {reason}\n"));
        }
    }

    if !result.composite_pk_fallbacks.is_empty() {
        output.push_str("\nComposite keys:\n");
        for (table, fallback) in &result.composite_pk_fallbacks {
            output.push_str(&format!("  - {table}: ({})\n", fallback.columns.join(", ")));
        }
    }

    if !result.overlaps.is_empty() {
        output.push_str("\nColumn overlap:\n");
        for overlap in &result.overlaps {
            output.push_str(&format!(
                "  - {} / {}: {:.2}\n",
                overlap.table_a, overlap.table_b, overlap.score
            ));
        }
    }

    if !result.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &result.warnings {
            output.push_str(&format!("  - {warning}\n"));
        }
    }

    output
}

/// One line per DDL import problem
pub fn format_import_errors(errors: &[ImportError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}\n"))
        .collect()
}
