//! Schema inference CLI.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

mod args;
mod commands;
mod error;
mod logging;
mod output;

use crate::args::{Cli, Command, LogFormatArg};
use crate::commands::{diagram::handle_diagram, infer::handle_infer, validate::handle_validate};
use crate::logging::{LogConfig, LogFormat, init_logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&log_config_from_cli(&cli));

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Infer(args) => handle_infer(&args).context("schema inference failed"),
        Command::Diagram(args) => {
            handle_diagram(&args).with_context(|| format!("cannot render {}", args.input))
        }
        Command::Validate(args) => {
            handle_validate(&args).with_context(|| format!("{} is not valid DDL", args.input))
        }
    }
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    LogConfig::from_verbosity(cli.verbose).with_format(format)
}
