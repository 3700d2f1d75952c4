//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use foundry_domain::{ArticleInput, UseCaseCandidate, UseCaseResult};
use foundry_extractor::{truncate_chars, ArticleOutcome, RunSummary};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Longest problem text shown in a table cell.
const PROBLEM_CELL_CHARS: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format extracted use cases.
    pub fn format_results(&self, results: &[UseCaseResult]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(results)?),
            OutputFormat::Quiet => Ok(results
                .iter()
                .map(|r| r.use_case.title.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if results.is_empty() {
                    return Ok(self.colorize("No use case found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record([
                    "Title",
                    "AI Solution",
                    "Problem",
                    "Category",
                    "Industry",
                    "Chunk",
                    "Date",
                ]);
                for result in results {
                    let use_case = &result.use_case;
                    builder.push_record([
                        use_case.title.clone(),
                        use_case.ai_solution.clone(),
                        truncate_chars(&use_case.problem, PROBLEM_CELL_CHARS).to_string(),
                        use_case.category_or_default().join(", "),
                        use_case.industry_or_default().join(", "),
                        use_case.source_chunk.to_string(),
                        result.date.to_string(),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// Format candidates parsed from a raw reply.
    pub fn format_candidates(&self, candidates: &[UseCaseCandidate]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(candidates)?),
            OutputFormat::Quiet => Ok(candidates.len().to_string()),
            OutputFormat::Table => {
                if candidates.is_empty() {
                    return Ok(self.colorize("No valid candidate in reply.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record([
                    "#",
                    "Title",
                    "AI Solution",
                    "Problem",
                    "Category",
                    "Industry",
                ]);
                for (i, candidate) in candidates.iter().enumerate() {
                    builder.push_record([
                        (i + 1).to_string(),
                        candidate.title.clone(),
                        candidate.ai_solution.clone(),
                        truncate_chars(&candidate.problem, PROBLEM_CELL_CHARS).to_string(),
                        candidate.category_or_default().join(", "),
                        candidate.industry_or_default().join(", "),
                    ]);
                }
                Ok(self.table(builder))
            }
        }
    }

    /// One status line per processed article.
    pub fn outcome_line(&self, article: &ArticleInput, outcome: &ArticleOutcome) -> String {
        match outcome {
            ArticleOutcome::Skipped { reason } => {
                self.info(&format!("Skipped {} ({})", article.url, reason))
            }
            ArticleOutcome::NoResult => {
                self.warning(&format!("No use case in {}", article.url))
            }
            ArticleOutcome::Published { use_case } => self.success(&format!(
                "Published \"{}\" from {}",
                use_case.use_case.title, article.url
            )),
            ArticleOutcome::PublishFailed { use_case, error } => self.error(&format!(
                "Could not publish \"{}\": {}",
                use_case.use_case.title, error
            )),
        }
    }

    /// Format run totals.
    pub fn format_summary(&self, summary: &RunSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
            OutputFormat::Quiet => Ok(summary.published.to_string()),
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Processed", "Skipped", "No result", "Published", "Failed"]);
                builder.push_record([
                    summary.processed.to_string(),
                    summary.skipped.to_string(),
                    summary.no_result.to_string(),
                    summary.published.to_string(),
                    summary.publish_failed.to_string(),
                ]);
                Ok(self.table(builder))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
