//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;
use std::path::Path;

/// Execute the config command.
///
/// Prints the effective configuration; with `--save` also writes it to
/// `path` (the `--config` file or the default location).
pub fn execute_config(
    args: ConfigArgs,
    config: &Config,
    path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    match formatter.format() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Table | OutputFormat::Quiet => print!("{}", config.to_toml()?),
    }

    if args.save {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Config::path()?,
        };
        config.save_to(&path)?;
        let message = format!("Saved configuration to {}", path.display());
        eprintln!("{}", formatter.success(&message));
    }
    Ok(())
}
