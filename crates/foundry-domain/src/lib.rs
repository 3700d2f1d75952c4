//! Foundry Domain Layer
//!
//! This crate holds the data model shared by every other layer of Foundry:
//! the article handed over by a feed reader, the use-case record parsed from
//! a model reply, and the final result handed to an archival sink.
//!
//! ## Key Concepts
//!
//! - **Article**: normalized plain-text body plus title, URL and publication time
//! - **Candidate**: a structurally valid use case parsed from one model reply
//! - **Winner**: the single candidate selected to represent an article
//! - **Domain keywords**: the fixed manufacturing/AI vocabulary used for
//!   relevance filtering and candidate scoring
//!
//! ## Architecture
//!
//! - Pure data and small pure functions only
//! - Trait definitions for the external sink and duplicate index
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod article;
pub mod keywords;
pub mod traits;
pub mod use_case;

// Re-exports for convenience
pub use article::ArticleInput;
pub use keywords::DOMAIN_KEYWORDS;
pub use traits::{SeenIndex, UseCaseSink};
pub use use_case::{SourceChunk, UseCaseCandidate, UseCaseResult, DEFAULT_TAG};
