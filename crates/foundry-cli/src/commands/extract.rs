//! Extract command implementation.

use super::{build_provider, read_input};
use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use foundry_domain::ArticleInput;
use foundry_extractor::{clean_text, Extractor};

/// Execute the extract command.
///
/// Runs the Extractor on one article and prints the winner, if any. No
/// filters are applied and nothing is published.
pub async fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let provider = build_provider(config, &args.secrets)?;
    let raw = read_input(args.file.as_deref(), args.stdin)?;

    let text = clean_text(&raw);
    if text.is_empty() {
        return Err(CliError::InvalidInput("Article body is empty".to_string()));
    }

    let mut article = ArticleInput::new(text, args.title, args.url);
    if let Some(published) = args.published.as_deref() {
        article = article.with_published_str(published);
    }

    let extractor = Extractor::new(provider, config.extractor.clone())?;
    let results: Vec<_> = extractor
        .extract(&article)
        .await
        .into_result()
        .into_iter()
        .collect();

    println!("{}", formatter.format_results(&results)?);
    Ok(())
}
