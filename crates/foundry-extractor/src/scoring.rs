//! Candidate scoring and winner selection

use crate::text::truncate_chars;
use foundry_domain::{UseCaseCandidate, DOMAIN_KEYWORDS};

/// Characters of a title-less candidate's problem quoted in the note
const PROBLEM_EXCERPT_CHARS: usize = 120;

/// Score a candidate against its source article
///
/// +3 per domain keyword in the candidate's title, problem and solution,
/// +1 per domain keyword anywhere in the article, +2 for a title and +3 for
/// a solution.
pub fn score(candidate: &UseCaseCandidate, article_text: &str) -> i64 {
    let combined = format!(
        "{} {} {}",
        candidate.title, candidate.problem, candidate.ai_solution
    )
    .to_lowercase();
    let article = article_text.to_lowercase();

    let mut total = 0;
    for keyword in DOMAIN_KEYWORDS {
        if combined.contains(keyword) {
            total += 3;
        }
        if article.contains(keyword) {
            total += 1;
        }
    }
    if !candidate.title.trim().is_empty() {
        total += 2;
    }
    if !candidate.ai_solution.trim().is_empty() {
        total += 3;
    }
    total
}

/// A candidate paired with its score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// The candidate
    pub candidate: UseCaseCandidate,
    /// Its score against the article
    pub score: i64,
}

/// Score every candidate and order them best first
///
/// Ties keep their original order.
pub fn rank(candidates: Vec<UseCaseCandidate>, article_text: &str) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|candidate| {
            let score = score(&candidate, article_text);
            ScoredCandidate { candidate, score }
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Pick the highest-scoring candidate
///
/// Runners-up are summarized into the winner's `note` (title, or the start
/// of the problem when there is no title), appended to any note the model
/// already gave and capped at `note_max_chars`.
pub fn select(
    candidates: Vec<UseCaseCandidate>,
    article_text: &str,
    note_max_chars: usize,
) -> Option<UseCaseCandidate> {
    let mut ranked = rank(candidates, article_text).into_iter();
    let mut winner = ranked.next()?.candidate;

    let others: Vec<String> = ranked
        .map(|scored| runner_up_label(&scored.candidate))
        .filter(|label| !label.is_empty())
        .collect();

    if !others.is_empty() {
        let existing = winner.note.take().unwrap_or_default();
        let existing = existing.trim();
        let joined = others.join("; ");
        let note = if existing.is_empty() {
            joined
        } else {
            format!("{}; {}", existing, joined)
        };
        let note = truncate_chars(note.trim(), note_max_chars).trim().to_string();
        winner.note = (!note.is_empty()).then_some(note);
    }

    Some(winner)
}

fn runner_up_label(candidate: &UseCaseCandidate) -> String {
    let title = candidate.title.trim();
    if title.is_empty() {
        truncate_chars(candidate.problem.trim(), PROBLEM_EXCERPT_CHARS)
            .trim()
            .to_string()
    } else {
        title.to_string()
    }
}
