//! Core data models used by the library.

use serde::Serialize;

/// A bounded slice of the document text; the unit of embedding and retrieval.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Chunk {
    /// Position in the chunk sequence (0-based).
    pub ordinal: usize,
    /// Byte offset of `text` within the document text.
    pub start: usize,
    /// Exact substring of the document text.
    pub text: String,
}

impl Chunk {
    /// Byte offset one past the end of the chunk.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Text extracted from a PDF.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PdfText {
    /// Concatenated page text in page order.
    pub text: String,
    /// Number of pages in the document.
    pub pages: usize,
    /// 1-based numbers of pages that contributed no text.
    pub empty_pages: Vec<u32>,
}

impl PdfText {
    /// Character count of the extracted text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Query parameters for RAG retrieval.
pub struct RagQuery<'a> {
    pub text: &'a str,
    pub top_k: usize,
}

/// A single retrieval hit; higher `score` is closer.
#[derive(Clone, Debug, Serialize)]
pub struct RagHit {
    pub score: f32,
    pub chunk: Chunk,
}

/// Clamps `s` to at most `max_chars` characters, appending `…` when cut.
pub fn clamp_snippet(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((byte_idx, _)) => {
            let mut out = s[..byte_idx].trim_end().to_string();
            out.push('…');
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_respects_char_boundaries() {
        assert_eq!(clamp_snippet("short", 10), "short");
        assert_eq!(clamp_snippet("ñañaña", 3), "ñañ…");
    }
}
