//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "schema-infer",
    version,
    about = "Infer a relational schema from CSV and JSON extracts",
    long_about = "Infer a relational schema from CSV and JSON extracts.\n\n\
                  Detects column types, primary and composite keys, foreign key\n\
                  relationships and shared entities, then emits SQL DDL, a Mermaid\n\
                  ER diagram or DBML."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,
}

#[derive(Subcommand)]
pub enum Command {
    /// Infer a schema from one or more data files.
    Infer(InferArgs),

    /// Render a diagram from DDL produced by `infer`.
    Diagram(DiagramArgs),

    /// Check that a DDL file parses.
    Validate(ValidateArgs),
}

#[derive(Parser)]
pub struct InferArgs {
    /// CSV or JSON files to analyze.
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// Pipeline configuration file (TOML).
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dialect hint for DDL rewriting.
    #[arg(long = "dialect")]
    pub dialect: Option<String>,

    /// Largest composite key searched for tables without a primary key.
    #[arg(long = "max-composite-key-columns", value_name = "N")]
    pub max_composite_key_columns: Option<usize>,

    /// Minimum similarity for grouping columns into entities (0.0-1.0).
    #[arg(long = "similarity-threshold", value_name = "F")]
    pub similarity_threshold: Option<f64>,

    /// Minimum similarity for cross-table value matches (0.0-1.0).
    #[arg(long = "match-cutoff", value_name = "F")]
    pub match_cutoff: Option<f64>,

    /// Pass the generated DDL through the rewriter.
    #[arg(long = "rewrite")]
    pub rewrite: bool,

    /// Ollama server used for rewriting.
    #[cfg(feature = "llm-online")]
    #[arg(long = "ollama-url", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Model used for rewriting.
    #[cfg(feature = "llm-online")]
    #[arg(long = "model", default_value = "llama3.2")]
    pub model: String,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "json")]
    pub format: InferFormatArg,

    /// Output file (stdout if not provided).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DiagramArgs {
    /// DDL file, or `-` for stdin.
    #[arg(value_name = "DDL_FILE")]
    pub input: String,

    /// Diagram format.
    #[arg(long = "format", value_enum, default_value = "mermaid")]
    pub format: DiagramFormatArg,

    /// Output file (stdout if not provided).
    #[arg(long = "output", short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// DDL file, or `-` for stdin.
    #[arg(value_name = "DDL_FILE")]
    pub input: String,

    /// SQL dialect to parse with (generic, postgres, mysql, sqlite, mssql, ...).
    #[arg(long = "dialect", default_value = "generic")]
    pub dialect: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InferFormatArg {
    /// Full result as JSON.
    Json,
    /// Full result as YAML.
    Yaml,
    /// DDL only.
    Sql,
    /// Mermaid ER diagram only.
    Mermaid,
    /// DBML only.
    Dbml,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DiagramFormatArg {
    Mermaid,
    Dbml,
    /// Normalized DDL
    Sql,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
