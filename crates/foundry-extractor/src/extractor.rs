//! Core Extractor implementation

use crate::chunking::Chunker;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::ReplyParser;
use crate::prompt::PromptBuilder;
use crate::scoring;
use crate::types::ExtractionOutcome;
use foundry_domain::{ArticleInput, SourceChunk, UseCaseCandidate, UseCaseResult};
use foundry_llm::{LlmProvider, ModelRequest};
use tracing::{debug, info, info_span, warn, Instrument};

/// The Extractor turns one article into at most one use case
///
/// Long text is chunked and each chunk is sent to the primary model. When no
/// chunk yields a valid candidate, the whole article is sent once to the
/// fallback model. The best-scoring candidate wins.
pub struct Extractor<L: LlmProvider> {
    llm: L,
    config: ExtractorConfig,
    chunker: Chunker,
    parser: ReplyParser,
}

impl<L: LlmProvider> Extractor<L> {
    /// Create a new Extractor
    ///
    /// # Errors
    ///
    /// Returns `ExtractorError::Config` when the configuration is invalid.
    pub fn new(llm: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate()?;
        Ok(Self {
            chunker: Chunker::from_config(&config),
            parser: ReplyParser::new(config.inferred_title_max_chars),
            llm,
            config,
        })
    }

    /// Extract the single most relevant use case from an article
    ///
    /// Never fails: provider errors and unparseable replies only reduce the
    /// set of candidates.
    pub async fn extract(&self, article: &ArticleInput) -> ExtractionOutcome {
        let span = info_span!("extract", url = %article.url);
        async {
            let candidates = self.collect_candidates(article).await;
            info!(candidates = candidates.len(), "Collected candidates");

            match scoring::select(candidates, &article.text, self.config.note_max_chars) {
                Some(winner) => {
                    info!(
                        title = %winner.title,
                        source_chunk = %winner.source_chunk,
                        "Selected use case"
                    );
                    ExtractionOutcome::Found(UseCaseResult::new(winner, article))
                }
                None => {
                    info!("No use case found");
                    ExtractionOutcome::NoResult
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run the primary model over every chunk, then the fallback model on the
    /// whole text if nothing was found
    ///
    /// Every prompt carries the article headline next to its excerpt.
    pub async fn collect_candidates(&self, article: &ArticleInput) -> Vec<UseCaseCandidate> {
        let text = article.text.as_str();
        let chunks = self.chunker.chunk(text);
        debug!(chars = text.chars().count(), chunks = chunks.len(), "Chunked article");

        let mut candidates = Vec::new();
        for chunk in &chunks {
            if chunk.index > 0 {
                self.pause().await;
            }
            debug!("Processing chunk {}/{}", chunk.index + 1, chunk.total);
            let found = self
                .ask(
                    &self.config.primary_model,
                    self.config.primary_max_tokens,
                    PromptBuilder::new(chunk.text).with_headline(&article.title),
                    SourceChunk::Chunk(chunk.index),
                )
                .await;
            candidates.extend(found);
        }

        if candidates.is_empty() {
            info!(
                model = %self.config.fallback_model,
                "No chunk candidates, trying fallback model"
            );
            if !chunks.is_empty() {
                self.pause().await;
            }
            let found = self
                .ask(
                    &self.config.fallback_model,
                    self.config.fallback_max_tokens,
                    PromptBuilder::new(text).with_headline(&article.title),
                    SourceChunk::WholeArticle,
                )
                .await;
            candidates.extend(found);
        }

        candidates
    }

    /// One model call, parsed and tagged with its origin
    async fn ask(
        &self,
        model: &str,
        max_tokens: u32,
        prompt: PromptBuilder<'_>,
        source: SourceChunk,
    ) -> Vec<UseCaseCandidate> {
        let request = ModelRequest::new(model, prompt.build(), max_tokens)
            .with_temperature(self.config.temperature);

        let reply = self.llm.complete(&request).await;
        let Some(text) = reply.text() else {
            if let Some(error) = reply.error() {
                warn!(
                    model,
                    source = %source,
                    kind = ?error.kind(),
                    attempts = reply.attempts,
                    "Model call failed: {}",
                    error
                );
            }
            return Vec::new();
        };

        debug!(model, source = %source, chars = text.len(), "Model replied");
        let candidates: Vec<UseCaseCandidate> = self
            .parser
            .parse_reply(text)
            .into_iter()
            .map(|candidate| candidate.with_source_chunk(source))
            .collect();
        if candidates.is_empty() {
            debug!(model, source = %source, "Reply held no valid use case");
        }
        candidates
    }

    async fn pause(&self) {
        let delay = self.config.chunk_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
