//! Diagram command implementation

use indexmap::IndexMap;
use schema_inference_sdk::export::{ExportFormat, render};
use schema_inference_sdk::import::SQLImporter;
use tracing::info;

use super::load_input;
use crate::args::{DiagramArgs, DiagramFormatArg};
use crate::error::CliError;
use crate::output::{format_import_errors, write_output};

/// Handle the diagram command
pub fn handle_diagram(args: &DiagramArgs) -> Result<(), CliError> {
    let content = load_input(&args.input)?;
    let result = SQLImporter::new().parse(&content);

    if !result.errors.is_empty() {
        eprintln!("DDL import problems:\n{}", format_import_errors(&result.errors));
    }
    if result.schema.is_empty() {
        return Err(CliError::ValidationError(
            "No tables found in DDL".to_string(),
        ));
    }
    info!(
        tables = result.schema.tables.len(),
        foreign_keys = result.keys.foreign_keys.len(),
        "DDL imported"
    );

    let format = match args.format {
        DiagramFormatArg::Mermaid => ExportFormat::Mermaid,
        DiagramFormatArg::Dbml => ExportFormat::Dbml,
        DiagramFormatArg::Sql => ExportFormat::Sql,
    };
    let rendered = render(format, &result.schema, &result.keys, &IndexMap::new());
    write_output(&rendered.content, args.output.as_deref())
}
