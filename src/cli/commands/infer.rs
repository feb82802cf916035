//! Infer command implementation

use std::path::Path;

use schema_inference_sdk::pipeline::{
    InferenceOptions, InferenceResult, PipelineConfig, SchemaPipeline,
};

use crate::args::{InferArgs, InferFormatArg};
use crate::error::CliError;
use crate::output::{format_summary, write_output};

/// Load a pipeline configuration from a TOML file
pub fn load_config(path: &Path) -> Result<PipelineConfig, CliError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::FileReadError(path.to_path_buf(), e.to_string()))?;
    toml::from_str(&content).map_err(|e| CliError::ConfigError(e.to_string()))
}

/// Options from the configuration file with command-line overrides applied
fn options_from_args(args: &InferArgs, config: &PipelineConfig) -> InferenceOptions {
    let mut options = config.options.clone();
    if let Some(dialect) = &args.dialect {
        options.dialect = dialect.clone();
    }
    if let Some(columns) = args.max_composite_key_columns {
        options.max_composite_key_columns = columns;
    }
    if let Some(threshold) = args.similarity_threshold {
        options.fuzzy_similarity_threshold = threshold;
    }
    if let Some(cutoff) = args.match_cutoff {
        options.fuzzy_match_cutoff = Some(cutoff);
    }
    if args.rewrite {
        options.use_llm_rewrite = true;
    }
    options
}

#[cfg(feature = "llm-online")]
fn build_pipeline(args: &InferArgs, config: PipelineConfig) -> SchemaPipeline {
    use schema_inference_sdk::rewrite::OllamaRewriter;

    let pipeline = SchemaPipeline::new(config);
    if args.rewrite {
        pipeline.with_rewriter(OllamaRewriter::new(&args.ollama_url, &args.model))
    } else {
        pipeline
    }
}

#[cfg(not(feature = "llm-online"))]
fn build_pipeline(_args: &InferArgs, config: PipelineConfig) -> SchemaPipeline {
    SchemaPipeline::new(config)
}

/// Render the part of `result` selected by `format`
fn render_result(result: &InferenceResult, format: InferFormatArg) -> Result<String, CliError> {
    let content = match format {
        InferFormatArg::Json => result
            .to_json()
            .map_err(|e| CliError::SerializationError(e.to_string()))?,
        InferFormatArg::Yaml => serde_yaml::to_string(result)
            .map_err(|e| CliError::SerializationError(e.to_string()))?,
        InferFormatArg::Sql => result.sql.clone(),
        InferFormatArg::Mermaid => result.diagram.clone(),
        InferFormatArg::Dbml => result.dbml.clone(),
    };
    Ok(content)
}

/// Handle the infer command
pub fn handle_infer(args: &InferArgs) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    config.validate().map_err(CliError::ConfigError)?;
    let options = options_from_args(args, &config);

    let pipeline = build_pipeline(args, config);
    let result = pipeline
        .try_infer(&args.files, &options)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    eprint!("{}", format_summary(&result));

    let content = render_result(&result, args.format)?;
    write_output(&content, args.output.as_deref())?;

    if !result.has_schema() {
        return Err(CliError::ValidationError(
            "No input file could be profiled".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_formats() {
        let mut result = InferenceResult::new("s1");
        result.sql = "CREATE TABLE t (\n  a INT NOT NULL\n);\n".to_string();
        result.tables = vec!["t".into()];

        let yaml = render_result(&result, InferFormatArg::Yaml).unwrap();
        assert!(yaml.contains("session_id: s1"));
        let back: InferenceResult = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.tables, vec!["t"]);

        let json = render_result(&result, InferFormatArg::Json).unwrap();
        assert!(json.contains("\"session_id\": \"s1\""));
        assert_eq!(render_result(&result, InferFormatArg::Sql).unwrap(), result.sql);
    }
}
