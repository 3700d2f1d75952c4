//! Text helpers shared by the parser, the selector and the runner

use regex::Regex;
use std::sync::LazyLock;

static TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)\b.*?</(script|style)>|<[^>]*>").expect("valid regex")
});
static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t\u{a0}]+").expect("valid regex"));
static EXTRA_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// Normalize scraped article text
///
/// Removes HTML tags (dropping `<script>` and `<style>` bodies), decodes the
/// common entities, collapses runs of spaces and tabs, trims every line and
/// keeps at most one blank line between paragraphs.
pub fn clean_text(raw: &str) -> String {
    let stripped = TAGS.replace_all(raw, " ");
    let unified = decode_entities(&stripped)
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let lines: Vec<String> = unified
        .lines()
        .map(|line| BLANK_RUNS.replace_all(line.trim(), " ").into_owned())
        .collect();
    EXTRA_NEWLINES
        .replace_all(lines.join("\n").trim(), "\n\n")
        .into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Byte offset just past the first `n` characters, `None` when `text` has at
/// most `n` characters
pub(crate) fn byte_offset_after(text: &str, n: usize) -> Option<usize> {
    text.char_indices().nth(n).map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        let raw = "  Robots   on\tthe line.  \r\n\r\n\r\n\r\nSecond\u{a0}\u{a0}paragraph.  ";
        assert_eq!(clean_text(raw), "Robots on the line.\n\nSecond paragraph.");
    }

    #[test]
    fn test_clean_text_strips_html() {
        let raw = "<p>Acme&nbsp;uses <b>AI</b> &amp; robots.</p><script>track()</script>";
        assert_eq!(clean_text(raw), "Acme uses AI & robots.");
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text(" \n\t \n"), "");
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_byte_offset_after() {
        assert_eq!(byte_offset_after("añb", 2), Some(3));
        assert_eq!(byte_offset_after("abc", 3), None);
    }
}
