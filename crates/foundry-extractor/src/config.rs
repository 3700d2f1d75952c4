//! Configuration for the Extractor and the article runner

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How article text is split into chunks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChunkPolicy {
    /// Non-overlapping chunks that together cover the whole text
    #[default]
    Disjoint,
    /// Each chunk repeats the tail of the previous one
    Overlapping {
        /// Characters repeated from the end of the previous chunk
        overlap_chars: usize,
    },
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum chunk size (characters) before the sentence-boundary search
    pub max_chunk_chars: usize,

    /// How far past the hard boundary to look for a sentence end (characters)
    pub boundary_lookahead_chars: usize,

    /// Chunking policy
    pub chunk_policy: ChunkPolicy,

    /// Model called once per chunk
    pub primary_model: String,

    /// Model called on the whole article when no chunk produced a candidate
    pub fallback_model: String,

    /// Token budget for primary calls
    pub primary_max_tokens: u32,

    /// Token budget for the fallback call
    pub fallback_max_tokens: u32,

    /// Sampling temperature, provider default when unset
    pub temperature: Option<f32>,

    /// Pause between consecutive model calls for one article (milliseconds)
    pub chunk_delay_ms: u64,

    /// Maximum length of the synthesized note (characters)
    pub note_max_chars: usize,

    /// Maximum length of a title inferred from an unlabelled line (characters)
    pub inferred_title_max_chars: usize,
}

impl Default for ExtractorConfig {
    /// Default configuration matching the OpenRouter free tier
    fn default() -> Self {
        Self {
            max_chunk_chars: 4_000,
            boundary_lookahead_chars: 200,
            chunk_policy: ChunkPolicy::Disjoint,
            primary_model: "google/gemma-9b:free".to_string(),
            fallback_model: "qwen/qwen-7b-instruct:free".to_string(),
            primary_max_tokens: 600,
            fallback_max_tokens: 800,
            temperature: None,
            chunk_delay_ms: 1_000,
            note_max_chars: 200,
            inferred_title_max_chars: 120,
        }
    }
}

impl ExtractorConfig {
    /// Same settings without any pauses, for tests and paid tiers
    pub fn fast() -> Self {
        Self {
            chunk_delay_ms: 0,
            ..Self::default()
        }
    }

    /// Pause between model calls as a Duration
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_chunk_chars == 0 {
            return Err(ExtractorError::Config(
                "max_chunk_chars must be greater than 0".to_string(),
            ));
        }
        if let ChunkPolicy::Overlapping { overlap_chars } = self.chunk_policy {
            if overlap_chars == 0 || overlap_chars >= self.max_chunk_chars {
                return Err(ExtractorError::Config(
                    "overlap_chars must be between 1 and max_chunk_chars - 1".to_string(),
                ));
            }
        }
        if self.primary_model.trim().is_empty() || self.fallback_model.trim().is_empty() {
            return Err(ExtractorError::Config(
                "primary_model and fallback_model must be set".to_string(),
            ));
        }
        if self.primary_max_tokens == 0 || self.fallback_max_tokens == 0 {
            return Err(ExtractorError::Config(
                "token budgets must be greater than 0".to_string(),
            ));
        }
        if self.inferred_title_max_chars == 0 {
            return Err(ExtractorError::Config(
                "inferred_title_max_chars must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

/// Configuration for the per-article runner wrapped around the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Articles shorter than this (characters) are skipped
    pub min_text_chars: usize,

    /// Skip articles that mention no domain keyword
    pub require_keyword: bool,

    /// Ask the sink's duplicate index before extracting
    pub check_duplicates: bool,

    /// Pause before each extraction after the first (milliseconds)
    pub article_delay_ms: u64,

    /// Append the winner's note to its problem text before publishing
    pub note_into_problem: bool,

    /// Maximum problem length after the note is appended (characters)
    pub problem_max_chars: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 200,
            require_keyword: true,
            check_duplicates: true,
            article_delay_ms: 8_000,
            note_into_problem: true,
            problem_max_chars: 2_000,
        }
    }
}

impl RunnerConfig {
    /// Pause between articles as a Duration
    pub fn article_delay(&self) -> Duration {
        Duration::from_millis(self.article_delay_ms)
    }
}
