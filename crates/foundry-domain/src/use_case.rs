//! Use-case records - candidates parsed from model replies and the final result

use crate::article::ArticleInput;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag used when a model leaves category or industry empty
pub const DEFAULT_TAG: &str = "General";

/// Where a candidate came from within an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum SourceChunk {
    /// Reply to the primary model for the chunk with this index
    Chunk(usize),
    /// Reply to the fallback model called on the whole article
    WholeArticle,
}

impl SourceChunk {
    /// Chunk index, or `None` for the whole-article fallback
    pub fn index(&self) -> Option<usize> {
        match self {
            SourceChunk::Chunk(i) => Some(*i),
            SourceChunk::WholeArticle => None,
        }
    }
}

impl From<SourceChunk> for i64 {
    fn from(source: SourceChunk) -> Self {
        match source {
            SourceChunk::Chunk(i) => i as i64,
            SourceChunk::WholeArticle => -1,
        }
    }
}

impl TryFrom<i64> for SourceChunk {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(SourceChunk::WholeArticle),
            v if v >= 0 => Ok(SourceChunk::Chunk(v as usize)),
            v => Err(format!("invalid source chunk index: {}", v)),
        }
    }
}

impl fmt::Display for SourceChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceChunk::Chunk(i) => write!(f, "chunk {}", i),
            SourceChunk::WholeArticle => write!(f, "whole article"),
        }
    }
}

/// A structurally valid but not-yet-selected use case
///
/// Produced by the reply parser. A candidate only survives parsing when
/// both `title` and `ai_solution` are non-empty (see [`is_valid`](Self::is_valid)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseCandidate {
    /// Short use-case title
    pub title: String,

    /// Problem being solved (may be empty)
    pub problem: String,

    /// AI/ML technique applied
    pub ai_solution: String,

    /// Category tags (e.g. "Manufacturing", "Logistics")
    pub category: Vec<String>,

    /// Industry tags
    pub industry: Vec<String>,

    /// Free-text annotation, e.g. other use cases mentioned in the article
    pub note: Option<String>,

    /// Origin of this candidate within the article
    pub source_chunk: SourceChunk,
}

impl UseCaseCandidate {
    /// Create a candidate with only the required fields set
    pub fn new(title: impl Into<String>, ai_solution: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            problem: String::new(),
            ai_solution: ai_solution.into(),
            category: Vec::new(),
            industry: Vec::new(),
            note: None,
            source_chunk: SourceChunk::Chunk(0),
        }
    }

    /// Set the problem statement
    pub fn with_problem(mut self, problem: impl Into<String>) -> Self {
        self.problem = problem.into();
        self
    }

    /// Set the origin chunk
    pub fn with_source_chunk(mut self, source_chunk: SourceChunk) -> Self {
        self.source_chunk = source_chunk;
        self
    }

    /// Both required fields are present
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.ai_solution.trim().is_empty()
    }

    /// Category tags, defaulting to [`DEFAULT_TAG`]
    pub fn category_or_default(&self) -> Vec<String> {
        tags_or_default(&self.category)
    }

    /// Industry tags, defaulting to [`DEFAULT_TAG`]
    pub fn industry_or_default(&self) -> Vec<String> {
        tags_or_default(&self.industry)
    }
}

fn tags_or_default(tags: &[String]) -> Vec<String> {
    let cleaned: Vec<String> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if cleaned.is_empty() {
        vec![DEFAULT_TAG.to_string()]
    } else {
        cleaned
    }
}

/// The winning use case with source metadata attached
///
/// This is the value handed to an archival sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseResult {
    /// The selected candidate
    #[serde(flatten)]
    pub use_case: UseCaseCandidate,

    /// Article URL
    pub source: String,

    /// Publication date, day precision
    pub date: NaiveDate,
}

impl UseCaseResult {
    /// Attach article metadata to a winning candidate
    ///
    /// # Examples
    ///
    /// ```
    /// use foundry_domain::{ArticleInput, UseCaseCandidate, UseCaseResult};
    ///
    /// let article = ArticleInput::new("body", "headline", "https://example.com/a");
    /// let candidate = UseCaseCandidate::new("Title", "computer vision");
    /// let result = UseCaseResult::new(candidate, &article);
    /// assert_eq!(result.source, "https://example.com/a");
    /// ```
    pub fn new(use_case: UseCaseCandidate, article: &ArticleInput) -> Self {
        Self {
            use_case,
            source: article.url.clone(),
            date: article.date(),
        }
    }
}
