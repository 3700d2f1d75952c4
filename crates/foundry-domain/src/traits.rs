//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the extraction pipeline and
//! the archival infrastructure. Implementations live in `foundry-store`.

use crate::UseCaseResult;
use async_trait::async_trait;

/// Archival sink receiving one call per winning use case
///
/// Implemented by the infrastructure layer (foundry-store)
#[async_trait]
pub trait UseCaseSink: Send {
    /// Error type for sink operations
    type Error: std::fmt::Display + Send;

    /// Persist a use case
    async fn publish(&mut self, result: &UseCaseResult) -> Result<(), Self::Error>;
}

/// Index of previously archived articles
///
/// Implemented by the infrastructure layer (foundry-store)
#[async_trait]
pub trait SeenIndex: Send {
    /// Error type for lookups
    type Error: std::fmt::Display + Send;

    /// Whether a record with exactly this source URL or exactly this title exists
    ///
    /// `title` is the article headline, checked before any extraction. It is
    /// compared against the stored use-case titles, so it only matches when a
    /// model reused the headline as the use-case title. The URL check is the
    /// one that reliably catches a re-run over the same article.
    async fn is_seen(&mut self, url: &str, title: &str) -> Result<bool, Self::Error>;
}
