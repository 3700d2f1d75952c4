//! Article input handed over by the feed reader

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article ready for extraction
///
/// Created by the feed collaborator and read-only afterwards. The body is
/// expected to be normalized plain text (see `foundry_extractor::clean_text`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleInput {
    /// Normalized plain-text body
    pub text: String,

    /// Headline as published by the feed
    pub title: String,

    /// Canonical article URL
    pub url: String,

    /// Publication time (ingestion time when the feed value was unusable)
    #[serde(default = "Utc::now")]
    pub published_at: DateTime<Utc>,
}

impl ArticleInput {
    /// Create an article published "now"
    ///
    /// # Examples
    ///
    /// ```
    /// use foundry_domain::ArticleInput;
    ///
    /// let article = ArticleInput::new("Body text", "Headline", "https://example.com/a");
    /// assert_eq!(article.title, "Headline");
    /// ```
    pub fn new(
        text: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            title: title.into(),
            url: url.into(),
            published_at: Utc::now(),
        }
    }

    /// Set the publication time
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = published_at;
        self
    }

    /// Set the publication time from a raw feed string
    ///
    /// Accepts RFC 3339 and RFC 2822 timestamps. Anything else (including
    /// date-only values without a time component) keeps the ingestion time.
    ///
    /// # Examples
    ///
    /// ```
    /// use foundry_domain::ArticleInput;
    ///
    /// let article = ArticleInput::new("t", "h", "u")
    ///     .with_published_str("Tue, 01 Jul 2025 10:00:00 +0000");
    /// assert_eq!(article.date().to_string(), "2025-07-01");
    /// ```
    pub fn with_published_str(mut self, raw: &str) -> Self {
        if let Some(parsed) = parse_timestamp(raw) {
            self.published_at = parsed;
        }
        self
    }

    /// Publication date truncated to day precision
    pub fn date(&self) -> chrono::NaiveDate {
        self.published_at.date_naive()
    }

    /// Body length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Parse a feed timestamp, returning `None` when it is unusable
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}
