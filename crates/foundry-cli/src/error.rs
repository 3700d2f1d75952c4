//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required secret was not provided
    #[error("Missing {0}: set the environment variable or pass the matching flag")]
    MissingSecret(&'static str),

    /// Model provider error
    #[error("LLM error: {0}")]
    Llm(#[from] foundry_llm::LlmError),

    /// Extractor error
    #[error("Extractor error: {0}")]
    Extractor(#[from] foundry_extractor::ExtractorError),

    /// Storage error
    #[error("Storage error: {0}")]
    Store(#[from] foundry_store::StoreError),

    /// Feed error
    #[error("Feed error: {0}")]
    Feed(#[from] foundry_feeds::FeedError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
