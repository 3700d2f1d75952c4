//! Foundry Storage Layer
//!
//! Archival sinks for extracted use cases, each also serving as the duplicate
//! index consulted before extraction.
//!
//! # Architecture
//!
//! - [`SqliteStore`]: local SQLite archive, one row per article URL
//! - [`NotionSink`]: pages in a Notion database with a fixed property schema
//!
//! # Examples
//!
//! ```no_run
//! use foundry_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! assert_eq!(store.count().unwrap(), 0);
//! ```

#![warn(missing_docs)]

mod notion;
mod sqlite;

pub use notion::{NotionSink, NOTION_API_BASE, NOTION_VERSION};
pub use sqlite::SqliteStore;

use thiserror::Error;

/// Maximum stored title length (characters)
pub const TITLE_MAX_CHARS: usize = 200;

/// Maximum length of one Notion rich-text value (characters)
pub const RICH_TEXT_MAX_CHARS: usize = 2_000;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A record for this source URL already exists
    #[error("Duplicate source: {0}")]
    Duplicate(String),

    /// Network error talking to a remote sink
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote sink answered with a non-success status
    #[error("Remote sink returned {status}: {body}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Start of the response body
        body: String,
    },

    /// Sink misconfigured
    #[error("Configuration error: {0}")]
    Config(String),
}

/// First `max_chars` characters of `text`
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
