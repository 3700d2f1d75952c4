//! Per-article pipeline around the Extractor
//!
//! ```text
//! Article → run dedup → length → relevance → sink dedup → Extractor → Sink
//! ```

use crate::config::RunnerConfig;
use crate::extractor::Extractor;
use crate::text::truncate_chars;
use crate::types::{ArticleOutcome, ExtractionOutcome, RunSummary, SkipReason};
use foundry_domain::{keywords, ArticleInput, SeenIndex, UseCaseResult, UseCaseSink};
use foundry_llm::LlmProvider;
use std::collections::HashSet;
use tracing::{error, info, warn};

/// Drives articles through filtering, extraction and publishing
///
/// Owns the per-run set of URLs already handled. Sink and duplicate-index
/// failures are logged and never abort the run.
pub struct ArticleRunner<L: LlmProvider> {
    extractor: Extractor<L>,
    config: RunnerConfig,
    seen_urls: HashSet<String>,
    extracted_before: bool,
}

impl<L: LlmProvider> ArticleRunner<L> {
    /// Create a runner around an Extractor
    pub fn new(extractor: Extractor<L>, config: RunnerConfig) -> Self {
        Self {
            extractor,
            config,
            seen_urls: HashSet::new(),
            extracted_before: false,
        }
    }

    /// Process one article and publish its use case, if any
    pub async fn process<S>(&mut self, article: &ArticleInput, store: &mut S) -> ArticleOutcome
    where
        S: UseCaseSink + SeenIndex,
    {
        if let Some(reason) = self.prefilter(article) {
            info!(url = %article.url, "Skipping article: {}", reason);
            return ArticleOutcome::Skipped { reason };
        }

        if self.config.check_duplicates {
            match store.is_seen(&article.url, &article.title).await {
                Ok(true) => {
                    info!(url = %article.url, "Skipping article: {}", SkipReason::AlreadyPublished);
                    return ArticleOutcome::Skipped {
                        reason: SkipReason::AlreadyPublished,
                    };
                }
                Ok(false) => {}
                Err(e) => warn!(url = %article.url, "Duplicate check failed, continuing: {}", e),
            }
        }

        if self.extracted_before {
            let delay = self.config.article_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        self.extracted_before = true;

        info!(url = %article.url, title = %article.title, "Extracting use case");
        let mut result = match self.extractor.extract(article).await {
            ExtractionOutcome::Found(result) => result,
            ExtractionOutcome::NoResult => return ArticleOutcome::NoResult,
        };
        if self.config.note_into_problem {
            fold_note(&mut result, self.config.problem_max_chars);
        }

        match store.publish(&result).await {
            Ok(()) => {
                info!(url = %article.url, title = %result.use_case.title, "Published use case");
                ArticleOutcome::Published { use_case: result }
            }
            Err(e) => {
                error!(url = %article.url, "Failed to publish use case: {}", e);
                ArticleOutcome::PublishFailed {
                    use_case: result,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Process a batch of articles in order
    ///
    /// `on_outcome` sees every article together with what happened to it.
    pub async fn run<S, I, F>(
        &mut self,
        articles: I,
        store: &mut S,
        mut on_outcome: F,
    ) -> RunSummary
    where
        S: UseCaseSink + SeenIndex,
        I: IntoIterator<Item = ArticleInput>,
        F: FnMut(&ArticleInput, &ArticleOutcome),
    {
        let mut summary = RunSummary::default();
        for article in articles {
            let outcome = self.process(&article, store).await;
            on_outcome(&article, &outcome);
            summary.record(&outcome);
        }
        info!(
            processed = summary.processed,
            published = summary.published,
            skipped = summary.skipped,
            no_result = summary.no_result,
            publish_failed = summary.publish_failed,
            "Run complete"
        );
        summary
    }

    /// Cheap filters applied before any network call
    fn prefilter(&mut self, article: &ArticleInput) -> Option<SkipReason> {
        if !self.seen_urls.insert(article.url.clone()) {
            return Some(SkipReason::SeenThisRun);
        }
        if article.char_len() < self.config.min_text_chars {
            return Some(SkipReason::TooShort);
        }
        if self.config.require_keyword
            && !keywords::is_relevant(&article.title)
            && !keywords::is_relevant(&article.text)
        {
            return Some(SkipReason::NotRelevant);
        }
        None
    }
}

/// Move the winner's note into its problem as `"  (Note: ...)"`
fn fold_note(result: &mut UseCaseResult, problem_max_chars: usize) {
    let Some(note) = result.use_case.note.take() else {
        return;
    };
    let combined = format!("{}  (Note: {})", result.use_case.problem, note);
    result.use_case.problem = truncate_chars(combined.trim(), problem_max_chars).to_string();
}
