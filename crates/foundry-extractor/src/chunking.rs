//! Sentence-aware text chunking
//!
//! Text longer than the chunk size is cut at the hard boundary, then the cut
//! is moved forward to the first sentence end (`.`, `?` or `!` followed by
//! whitespace) found within the lookahead window. Sizes are counted in
//! characters, never bytes, so multi-byte text is never split mid-character.

use crate::config::{ChunkPolicy, ExtractorConfig};
use crate::text::byte_offset_after;
use crate::types::TextChunk;

/// Splits article text into model-sized chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    max_chars: usize,
    lookahead_chars: usize,
    overlap_chars: usize,
}

impl Chunker {
    /// Create a chunker with non-overlapping chunks
    pub fn new(max_chars: usize, lookahead_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
            lookahead_chars,
            overlap_chars: 0,
        }
    }

    /// Create a chunker from the extractor configuration
    pub fn from_config(config: &ExtractorConfig) -> Self {
        let chunker = Self::new(config.max_chunk_chars, config.boundary_lookahead_chars);
        match config.chunk_policy {
            ChunkPolicy::Disjoint => chunker,
            ChunkPolicy::Overlapping { overlap_chars } => chunker.with_overlap(overlap_chars),
        }
    }

    /// Repeat the last `overlap_chars` characters of each chunk at the start
    /// of the next one
    pub fn with_overlap(mut self, overlap_chars: usize) -> Self {
        self.overlap_chars = overlap_chars;
        self
    }

    /// Lazily iterate over chunk slices of `text`
    ///
    /// Text that fits in one chunk is yielded unchanged, even when empty.
    /// Otherwise every yielded slice is trimmed and empty pieces are dropped.
    pub fn spans<'a>(&self, text: &'a str) -> Spans<'a> {
        let whole = byte_offset_after(text, self.max_chars).is_none();
        Spans {
            text,
            pos: 0,
            whole,
            max_chars: self.max_chars,
            lookahead_chars: self.lookahead_chars,
            overlap_chars: self.overlap_chars,
        }
    }

    /// Split `text` into indexed chunks
    pub fn chunk<'a>(&self, text: &'a str) -> Vec<TextChunk<'a>> {
        let pieces: Vec<&'a str> = self.spans(text).collect();
        let total = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(index, text)| TextChunk { index, total, text })
            .collect()
    }
}

/// Iterator over the chunks of one text, see [`Chunker::spans`]
#[derive(Debug, Clone)]
pub struct Spans<'a> {
    text: &'a str,
    pos: usize,
    whole: bool,
    max_chars: usize,
    lookahead_chars: usize,
    overlap_chars: usize,
}

impl<'a> Spans<'a> {
    /// Byte length of the next raw piece of `rest`
    fn next_cut(&self, rest: &str) -> usize {
        let Some(hard) = byte_offset_after(rest, self.max_chars) else {
            return rest.len();
        };
        let window_end = byte_offset_after(&rest[hard..], self.lookahead_chars)
            .map(|offset| hard + offset)
            .unwrap_or(rest.len());
        sentence_end(&rest[hard..window_end])
            .map(|offset| hard + offset)
            .unwrap_or(hard)
    }

    /// Start of the piece after `[start, end)` once overlap is applied
    fn next_start(&self, start: usize, end: usize) -> usize {
        if self.overlap_chars == 0 || end >= self.text.len() {
            return end;
        }
        let piece = &self.text[start..end];
        let piece_chars = piece.chars().count();
        if self.overlap_chars >= piece_chars {
            return end;
        }
        byte_offset_after(piece, piece_chars - self.overlap_chars)
            .map(|offset| start + offset)
            .unwrap_or(end)
    }
}

impl<'a> Iterator for Spans<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.whole {
            self.whole = false;
            self.pos = self.text.len();
            return Some(self.text);
        }

        while self.pos < self.text.len() {
            let start = self.pos;
            let rest = &self.text[start..];
            let end = start + self.next_cut(rest);
            self.pos = self.next_start(start, end);

            let piece = self.text[start..end].trim();
            if !piece.is_empty() {
                return Some(piece);
            }
        }
        None
    }
}

/// Byte offset just after the first sentence terminator in `window` that is
/// followed by whitespace inside the window
fn sentence_end(window: &str) -> Option<usize> {
    let mut chars = window.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '?' | '!') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    return Some(idx + c.len_utf8());
                }
            }
        }
    }
    None
}
