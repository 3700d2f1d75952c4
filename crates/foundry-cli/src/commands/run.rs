//! Run command implementation.

use super::{build_provider, require_secret};
use crate::cli::{RunArgs, SinkKind};
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use foundry_domain::ArticleInput;
use foundry_extractor::{clean_text, ArticleOutcome, ArticleRunner, Extractor};
use foundry_feeds::{collect_articles, RssFeedSource};
use foundry_store::{NotionSink, SqliteStore};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the run command.
///
/// Articles come from `--articles` when given, otherwise from the `[feeds]`
/// list.
pub async fn execute_run(args: RunArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    // Secrets first, so a misconfigured run fails before any work
    let provider = build_provider(config, &args.secrets)?;
    let notion = match args.sink {
        SinkKind::Notion => Some((
            require_secret(args.notion_token.as_deref(), "NOTION_TOKEN")?,
            require_secret(args.notion_database_id.as_deref(), "NOTION_DATABASE_ID")?,
        )),
        SinkKind::Sqlite => None,
    };

    let articles = match args.articles.as_deref() {
        Some(path) => read_article_file(path)?,
        None => read_feeds(config, formatter).await?,
    };

    let extractor = Extractor::new(provider, config.extractor.clone())?;
    let mut runner = ArticleRunner::new(extractor, config.runner.clone());

    let quiet = formatter.format() == OutputFormat::Quiet;
    let report = |article: &ArticleInput, outcome: &ArticleOutcome| {
        if !quiet {
            eprintln!("{}", formatter.outcome_line(article, outcome));
        }
    };

    let summary = match notion {
        Some((token, database_id)) => {
            let mut sink = NotionSink::new(token, database_id)?;
            runner.run(articles, &mut sink, report).await
        }
        None => {
            let path = config.db_path(args.db)?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let mut store = SqliteStore::new(&path)?;
            runner.run(articles, &mut store, report).await
        }
    };

    println!("{}", formatter.format_summary(&summary)?);
    Ok(())
}

fn read_article_file(path: &Path) -> Result<Vec<ArticleInput>> {
    let raw = fs::read_to_string(path)?;
    let articles = parse_articles(&raw)?;
    info!(count = articles.len(), path = %path.display(), "Loaded articles");
    Ok(articles)
}

/// Pull the configured feeds; unreadable feeds are reported and skipped.
async fn read_feeds(config: &Config, formatter: &Formatter) -> Result<Vec<ArticleInput>> {
    let sources = RssFeedSource::from_config(&config.feeds)?;
    let batch = collect_articles(&sources).await;
    if formatter.format() != OutputFormat::Quiet {
        for (feed, error) in &batch.failed {
            eprintln!("{}", formatter.warning(&format!("Skipped feed {}: {}", feed, error)));
        }
    }
    info!(
        count = batch.articles.len(),
        feeds = sources.len(),
        failed = batch.failed.len(),
        "Loaded articles from feeds"
    );
    Ok(batch.articles)
}

/// One entry of the articles file, as a feed reader would emit it.
#[derive(Debug, Deserialize)]
struct ArticleRecord {
    title: String,
    #[serde(alias = "link")]
    url: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, alias = "published_at")]
    published: Option<String>,
}

impl ArticleRecord {
    fn into_article(self) -> ArticleInput {
        // Feeds without a full body carry summary and content separately
        let body = match self.text {
            Some(text) => text,
            None => [self.summary, self.content]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join("\n\n"),
        };
        let article = ArticleInput::new(clean_text(&body), self.title.trim(), self.url.trim());
        match self.published {
            Some(published) => article.with_published_str(&published),
            None => article,
        }
    }
}

fn parse_articles(json: &str) -> Result<Vec<ArticleInput>> {
    let records: Vec<ArticleRecord> = serde_json::from_str(json)?;
    if records.is_empty() {
        return Err(CliError::InvalidInput("No articles provided".to_string()));
    }
    Ok(records.into_iter().map(ArticleRecord::into_article).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_articles_with_full_text() {
        let articles = parse_articles(
            r#"[{
                "title": " Acme deploys vision QA ",
                "url": "https://example.com/a",
                "text": "<p>Acme uses <b>computer vision</b> &amp; robots.</p>",
                "published": "2024-05-02T08:30:00Z"
            }]"#,
        )
        .unwrap();

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Acme deploys vision QA");
        assert_eq!(articles[0].text, "Acme uses computer vision & robots.");
        assert_eq!(articles[0].date().to_string(), "2024-05-02");
    }

    #[test]
    fn test_summary_and_content_are_joined() {
        let articles = parse_articles(
            r#"[{
                "title": "T",
                "link": "https://example.com/b",
                "summary": "Short summary.",
                "content": "Longer body."
            }]"#,
        )
        .unwrap();

        assert_eq!(articles[0].url, "https://example.com/b");
        assert!(articles[0].text.starts_with("Short summary."));
        assert!(articles[0].text.ends_with("Longer body."));
    }

    #[test]
    fn test_empty_batch_rejected() {
        assert!(matches!(parse_articles("[]"), Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_batch_rejected() {
        assert!(matches!(parse_articles("{\"title\": 1}"), Err(CliError::Serialization(_))));
    }
}
