//! Validate command implementation

use schema_inference_sdk::validation::validate_ddl;

use super::load_input;
use crate::args::ValidateArgs;
use crate::error::CliError;

/// Handle the validate command
pub fn handle_validate(args: &ValidateArgs) -> Result<(), CliError> {
    let content = load_input(&args.input)?;
    let statements = validate_ddl(&content, &args.dialect)
        .map_err(|e| CliError::ValidationError(e.to_string()))?;
    println!("Validation successful: {statements} statement(s)");
    Ok(())
}
