//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur while setting up extraction
///
/// Extraction itself never fails: provider and parse problems degrade to
/// "no result" for the affected chunk or article.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
