//! Separator-aware fixed-size chunking with overlap.
//!
//! A chunk grows up to `chunk_size` characters and ends on the last separator
//! boundary that fits. When no boundary fits, it is cut at exactly
//! `chunk_size` characters. The next chunk re-starts inside the tail of the
//! previous one (at most `chunk_overlap` characters back) so that context
//! crossing a boundary is seen by both chunks.
//!
//! Chunks are exact substrings of the input and carry their byte offsets.
//! Every chunk ends strictly after its predecessor. Whitespace-only pieces
//! are not emitted, so stitching by offsets only skips whitespace.

use tracing::debug;

use crate::{config::ChunkingConfig, errors::RagError, record::Chunk};

/// Splits document text into overlapping [`Chunk`]s.
#[derive(Clone, Debug)]
pub struct TextChunker {
    cfg: ChunkingConfig,
}

impl TextChunker {
    /// # Errors
    /// Returns `RagError::Config` if the sizes are invalid.
    pub fn new(cfg: ChunkingConfig) -> Result<Self, RagError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.cfg
    }

    /// Splits `text`; empty or whitespace-only text yields no chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let boundaries = separator_boundaries(text, &self.cfg.separator);
        let mut out = Vec::new();
        let mut pos = 0usize;

        loop {
            let (end, raw_cut) = self.chunk_end(text, &boundaries, pos);

            let piece = &text[pos..end];
            if !piece.trim().is_empty() {
                out.push(Chunk {
                    ordinal: out.len(),
                    start: pos,
                    text: piece.to_string(),
                });
            }

            if end == text.len() {
                break;
            }
            pos = self.next_start(text, &boundaries, pos, end, raw_cut);
        }

        debug!(
            chunks = out.len(),
            chunk_size = self.cfg.chunk_size,
            overlap = self.cfg.chunk_overlap,
            "text split"
        );
        out
    }

    /// End of the chunk starting at `pos`, and whether it was a raw cut.
    fn chunk_end(&self, text: &str, boundaries: &[usize], pos: usize) -> (usize, bool) {
        let limit = advance_chars(text, pos, self.cfg.chunk_size);
        if limit == text.len() {
            return (limit, false);
        }
        match last_boundary_within(boundaries, pos, limit) {
            Some(b) => (b, false),
            None => (limit, true),
        }
    }

    /// Start of the chunk following `[pos, end)`; always in `(pos, end]`.
    ///
    /// A boundary inside the overlap window is only used if the chunk
    /// starting there reaches past `end`.
    fn next_start(
        &self,
        text: &str,
        boundaries: &[usize],
        pos: usize,
        end: usize,
        raw_cut: bool,
    ) -> usize {
        if self.cfg.chunk_overlap == 0 {
            return end;
        }
        let window = retreat_chars(text, end, self.cfg.chunk_overlap);

        let first = boundaries.partition_point(|&b| b < window.max(pos + 1));
        let advancing = boundaries[first..]
            .iter()
            .take_while(|&&b| b < end)
            .find(|&&b| self.chunk_end(text, boundaries, b).0 > end);
        if let Some(&b) = advancing {
            return b;
        }
        if raw_cut && window > pos {
            window
        } else {
            end
        }
    }
}

/// Byte offsets just past every separator occurrence.
fn separator_boundaries(text: &str, separator: &str) -> Vec<usize> {
    if separator.is_empty() {
        return Vec::new();
    }
    text.match_indices(separator)
        .map(|(i, s)| i + s.len())
        .collect()
}

/// Largest boundary `b` with `pos < b <= limit`.
fn last_boundary_within(boundaries: &[usize], pos: usize, limit: usize) -> Option<usize> {
    let idx = boundaries.partition_point(|&b| b <= limit);
    boundaries[..idx].last().copied().filter(|&b| b > pos)
}

/// Byte offset `n` characters after `from` (clamped to the end).
fn advance_chars(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| from + i)
}

/// Byte offset `n` characters before `to` (clamped to the start).
fn retreat_chars(text: &str, to: usize, n: usize) -> usize {
    text[..to]
        .char_indices()
        .rev()
        .nth(n.saturating_sub(1))
        .map_or(0, |(i, _)| i)
}
