//! Foundry Extractor
//!
//! Turns one news article into at most one AI-in-manufacturing use case,
//! using a remote language model as an unreliable extractor.
//!
//! # Architecture
//!
//! ```text
//! Article → Chunker → LLM (primary per chunk, fallback on whole text)
//!         → Parser → Scorer/Selector → UseCaseResult → Sink
//! ```
//!
//! # Key Features
//!
//! - **Sentence-aware chunking**: character-counted chunks cut at sentence ends
//! - **Tolerant parsing**: label lines, bare or fenced JSON, JSON arrays, skip markers
//! - **Deterministic selection**: keyword scoring with stable tie-breaking
//! - **Graceful degradation**: failed calls and bad replies only shrink the candidate set
//! - **Article runner**: run-level dedup, relevance filter, sink dedup and publishing
//!
//! # Example Usage
//!
//! ```no_run
//! use foundry_domain::ArticleInput;
//! use foundry_extractor::{Extractor, ExtractorConfig, ExtractionOutcome};
//! use foundry_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new("Title: Vision QA\nAI Solution: computer vision");
//! let extractor = Extractor::new(llm, ExtractorConfig::fast())?;
//!
//! let article = ArticleInput::new(
//!     "Acme rolled out computer vision inspection on its stamping line.",
//!     "Acme bets on AI",
//!     "https://example.com/acme",
//! );
//!
//! if let ExtractionOutcome::Found(result) = extractor.extract(&article).await {
//!     println!("{} ({})", result.use_case.title, result.source);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
pub mod parser;
mod prompt;
mod runner;
pub mod scoring;
mod text;
mod types;


pub use chunking::{Chunker, Spans};
pub use config::{ChunkPolicy, ExtractorConfig, RunnerConfig};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use parser::{classify, parse, parse_reply, ReplyParser, ReplyShape};
pub use prompt::PromptBuilder;
pub use runner::ArticleRunner;
pub use scoring::{rank, score, select, ScoredCandidate};
pub use text::{clean_text, truncate_chars};
pub use types::{ArticleOutcome, ExtractionOutcome, RunSummary, SkipReason, TextChunk};
