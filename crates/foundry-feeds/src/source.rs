//! Feed sources and the per-feed error boundary

use crate::{FeedConfig, FeedError};
use async_trait::async_trait;
use feed_rs::model::Entry;
use foundry_domain::ArticleInput;
use foundry_extractor::clean_text;
use tracing::{debug, info, warn};

/// Headline used for entries that carry none
pub const UNTITLED: &str = "(no title)";

/// A source of articles pulled on demand
#[async_trait]
pub trait PullFeed: Send + Sync {
    /// Name used in logs and failure reports
    fn name(&self) -> &str;

    /// Fetch the current articles of this source
    async fn pull(&self) -> Result<Vec<ArticleInput>, FeedError>;
}

/// An RSS or Atom feed fetched over HTTP
#[derive(Debug, Clone)]
pub struct RssFeedSource {
    url: String,
    client: reqwest::Client,
    limit: usize,
}

impl RssFeedSource {
    /// Create a source keeping the first `limit` entries of the feed at `url`
    pub fn new(url: impl Into<String>, client: reqwest::Client, limit: usize) -> Self {
        Self {
            url: url.into().trim().to_string(),
            client,
            limit,
        }
    }

    /// One source per configured feed, sharing a single HTTP client
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Config` for an invalid configuration and
    /// `FeedError::Http` when the client cannot be built.
    pub fn from_config(config: &FeedConfig) -> Result<Vec<Self>, FeedError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(config
            .urls
            .iter()
            .map(|url| Self::new(url.as_str(), client.clone(), config.per_feed_limit))
            .collect())
    }

    /// Feed URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PullFeed for RssFeedSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn pull(&self) -> Result<Vec<ArticleInput>, FeedError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await?;
        debug!(url = %self.url, bytes = body.len(), "Downloaded feed");
        parse_feed(&body, self.limit)
    }
}

/// Parse a feed document, keeping articles from its first `limit` entries
///
/// Entries without a link are dropped. The body is the entry summary and
/// content joined and cleaned; the publication time falls back to now.
pub fn parse_feed(body: &[u8], limit: usize) -> Result<Vec<ArticleInput>, FeedError> {
    let feed = feed_rs::parser::parse(body)?;
    Ok(feed
        .entries
        .into_iter()
        .take(limit)
        .filter_map(into_article)
        .collect())
}

fn into_article(entry: Entry) -> Option<ArticleInput> {
    let link = entry
        .links
        .iter()
        .find(|link| link.rel.as_deref().map_or(true, |rel| rel == "alternate"))
        .or_else(|| entry.links.first())?;
    let url = link.href.trim();
    if url.is_empty() {
        return None;
    }

    let title = entry
        .title
        .map(|text| text.content.trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());
    let summary = entry.summary.map(|text| text.content).unwrap_or_default();
    let content = entry
        .content
        .and_then(|content| content.body)
        .unwrap_or_default();
    let text = clean_text(&format!("{}\n\n{}", summary, content));

    let article = ArticleInput::new(text, title, url);
    Some(match entry.published {
        Some(published) => article.with_published_at(published),
        None => article,
    })
}

/// Articles gathered from several feeds
#[derive(Debug, Default)]
pub struct FeedBatch {
    /// Articles in feed order
    pub articles: Vec<ArticleInput>,

    /// Feeds that could not be read, with the reason
    pub failed: Vec<(String, FeedError)>,
}

/// Pull every source in order
///
/// A feed that fails is logged and recorded in [`FeedBatch::failed`]; the
/// remaining feeds are still read.
pub async fn collect_articles<F: PullFeed>(sources: &[F]) -> FeedBatch {
    let mut batch = FeedBatch::default();
    for source in sources {
        info!(feed = source.name(), "Fetching feed");
        match source.pull().await {
            Ok(articles) => {
                info!(feed = source.name(), count = articles.len(), "Read feed");
                batch.articles.extend(articles);
            }
            Err(e) => {
                warn!(feed = source.name(), "Failed to read feed, skipping: {}", e);
                batch.failed.push((source.name().to_string(), e));
            }
        }
    }
    batch
}
