//! Command implementations.

pub mod config;
pub mod extract;
pub mod parse;
pub mod run;

pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::parse::execute_parse;
pub use self::run::execute_run;

use crate::cli::ModelSecrets;
use crate::config::Config;
use crate::error::{CliError, Result};
use foundry_llm::ChatCompletionsProvider;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Read command input from a file or stdin.
pub(crate) fn read_input(file: Option<&Path>, stdin: bool) -> Result<String> {
    if stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else if let Some(path) = file {
        Ok(fs::read_to_string(path)?)
    } else {
        Err(CliError::InvalidInput(
            "Must specify either --file or --stdin".to_string(),
        ))
    }
}

/// Non-empty secret or `MissingSecret`.
pub(crate) fn require_secret(value: Option<&str>, name: &'static str) -> Result<String> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(CliError::MissingSecret(name)),
    }
}

/// Chat-completions provider from `[llm]` and the API key.
pub(crate) fn build_provider(
    config: &Config,
    secrets: &ModelSecrets,
) -> Result<ChatCompletionsProvider> {
    let api_key = require_secret(secrets.openrouter_key.as_deref(), "OPENROUTER_KEY")?;
    Ok(ChatCompletionsProvider::from_config(&config.llm, api_key)?)
}
