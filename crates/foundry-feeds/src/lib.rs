//! Foundry Feed Ingestion
//!
//! Pulls news articles from RSS and Atom feeds and turns each entry into an
//! [`ArticleInput`](foundry_domain::ArticleInput) with a normalized body.
//!
//! # Architecture
//!
//! - [`PullFeed`]: one source of articles
//! - [`RssFeedSource`]: a feed URL fetched over HTTP, first N entries kept
//! - [`collect_articles`]: pulls every source in order; a failing feed is
//!   logged and skipped so the others still run
//!
//! # Examples
//!
//! ```no_run
//! use foundry_feeds::{collect_articles, FeedConfig, RssFeedSource};
//!
//! # async fn example() -> Result<(), foundry_feeds::FeedError> {
//! let sources = RssFeedSource::from_config(&FeedConfig::default())?;
//! let batch = collect_articles(&sources).await;
//! println!("{} articles, {} feeds failed", batch.articles.len(), batch.failed.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod source;

pub use config::{FeedConfig, DEFAULT_FEEDS};
pub use source::{collect_articles, parse_feed, FeedBatch, PullFeed, RssFeedSource, UNTITLED};

use thiserror::Error;

/// Errors that can occur while pulling one feed
#[derive(Error, Debug)]
pub enum FeedError {
    /// Network error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The feed server answered with a non-success status
    #[error("Feed {url} returned {status}")]
    Status {
        /// Feed URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The body is not a readable RSS, Atom or JSON feed
    #[error("Parse error: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),

    /// Invalid feed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}
