//! Feed list and ingestion limits

use crate::FeedError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Feeds read when none are configured
pub const DEFAULT_FEEDS: [&str; 3] = [
    "https://industry4o.com/feed",
    "https://www.manufacturingdive.com/feeds/news/",
    "https://venturebeat.com/category/ai/feed/",
];

/// Which feeds to read and how much of each
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Feed URLs, read in order
    pub urls: Vec<String>,

    /// Entries taken from the top of each feed
    pub per_feed_limit: usize,

    /// Timeout for one feed download (seconds)
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            urls: DEFAULT_FEEDS.iter().map(|url| url.to_string()).collect(),
            per_feed_limit: 5,
            timeout_secs: 30,
        }
    }
}

impl FeedConfig {
    /// Download timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `FeedError::Config` for an empty feed list, a blank URL or a
    /// zero limit or timeout.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.urls.is_empty() {
            return Err(FeedError::Config("No feeds configured".to_string()));
        }
        if self.urls.iter().any(|url| url.trim().is_empty()) {
            return Err(FeedError::Config("Feed URL is empty".to_string()));
        }
        if self.per_feed_limit == 0 {
            return Err(FeedError::Config("per_feed_limit must be > 0".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(FeedError::Config("timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}
