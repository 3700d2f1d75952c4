//! Types produced by the Extractor and the article runner

use foundry_domain::UseCaseResult;
use serde::Serialize;
use std::fmt;

/// One chunk of article text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunk<'a> {
    /// Position of this chunk, starting at 0
    pub index: usize,
    /// Number of chunks the text was split into
    pub total: usize,
    /// Chunk text
    pub text: &'a str,
}

/// Result of extracting one article
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "use_case", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    /// A use case was found
    Found(UseCaseResult),
    /// No model call produced a valid candidate
    NoResult,
}

impl ExtractionOutcome {
    /// Consume the outcome, returning the use case if any
    pub fn into_result(self) -> Option<UseCaseResult> {
        match self {
            Self::Found(result) => Some(result),
            Self::NoResult => None,
        }
    }
}

/// Why the runner skipped an article before extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The URL already appeared earlier in this run
    SeenThisRun,
    /// Text shorter than the configured minimum
    TooShort,
    /// No domain keyword in title or text
    NotRelevant,
    /// The sink already holds this URL or title
    AlreadyPublished,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::SeenThisRun => "already seen in this run",
            Self::TooShort => "text too short",
            Self::NotRelevant => "no domain keyword",
            Self::AlreadyPublished => "already published",
        };
        f.write_str(reason)
    }
}

/// What happened to one article
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ArticleOutcome {
    /// Filtered out before any model call
    Skipped {
        /// Filter that rejected the article
        reason: SkipReason,
    },
    /// Models were called but nothing usable came back
    NoResult,
    /// Extracted and handed to the sink
    Published {
        /// The published record
        use_case: UseCaseResult,
    },
    /// Extracted but the sink rejected it
    PublishFailed {
        /// The record that could not be published
        use_case: UseCaseResult,
        /// Sink error message
        error: String,
    },
}

/// Totals for one run over a batch of articles
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Articles handed to the runner
    pub processed: usize,
    /// Articles filtered out before extraction
    pub skipped: usize,
    /// Articles with no extractable use case
    pub no_result: usize,
    /// Use cases accepted by the sink
    pub published: usize,
    /// Use cases the sink rejected
    pub publish_failed: usize,
}

impl RunSummary {
    /// Count one outcome
    pub fn record(&mut self, outcome: &ArticleOutcome) {
        self.processed += 1;
        match outcome {
            ArticleOutcome::Skipped { .. } => self.skipped += 1,
            ArticleOutcome::NoResult => self.no_result += 1,
            ArticleOutcome::Published { .. } => self.published += 1,
            ArticleOutcome::PublishFailed { .. } => self.publish_failed += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_outcomes() {
        let mut summary = RunSummary::default();
        summary.record(&ArticleOutcome::Skipped {
            reason: SkipReason::TooShort,
        });
        summary.record(&ArticleOutcome::NoResult);
        summary.record(&ArticleOutcome::NoResult);

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.no_result, 2);
        assert_eq!(summary.published, 0);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::NotRelevant.to_string(), "no domain keyword");
    }

    #[test]
    fn test_no_result_serializes_with_status() {
        let json = serde_json::to_value(ExtractionOutcome::NoResult).unwrap();
        assert_eq!(json["status"], "no_result");
    }
}
