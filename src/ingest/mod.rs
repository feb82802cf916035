//! File ingestion
//!
//! Reads uploaded CSV/JSON files, cleans them and profiles their columns.
//! Every failure maps to an [`IngestError`] whose message is the rejection
//! reason recorded for the file.

pub mod clean;
pub mod config;
pub mod delimited;
pub mod error;
pub mod frame;
pub mod profile;
pub mod reader;
pub mod records;

use std::path::Path;

use tracing::debug;

pub use clean::{clean_table, sanitize_column_name, sanitize_table_name};
pub use config::IngestConfig;
pub use error::{IngestError, IngestResult};
pub use frame::RawTable;
pub use profile::{even_sample, profile_table};
pub use reader::{LocalFileReader, SourceReader};

/// Table name derived from a file path's stem
pub fn table_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    sanitize_table_name(&stem)
}

/// Read, parse and clean one file into a raw table named after its stem.
pub fn load_table(
    reader: &dyn SourceReader,
    path: &Path,
    config: &IngestConfig,
) -> IngestResult<RawTable> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if !config.is_allowed_extension(&extension) {
        return Err(IngestError::UnsupportedFormat(extension));
    }

    let size = reader.size(path)?;
    if size > config.max_file_size {
        return Err(IngestError::TooLarge {
            size,
            max: config.max_file_size,
        });
    }

    let bytes = reader.read(path)?;
    let name = table_name_for(path);
    debug!(path = %path.display(), table = %name, size, "Loading file");

    let raw = match extension.as_str() {
        "json" => records::parse_records(&bytes, &name)?,
        _ => delimited::parse_delimited(&bytes, &name)?,
    };
    clean_table(raw, config)
}
