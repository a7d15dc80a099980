//! Public API types re-used by external crates (e.g., the HTTP API layer).

use serde::{Serialize, Serializer, ser::SerializeStruct};

/// Options that control retrieval for a single question.
///
/// # Example
/// ```
/// use contextor::AskOptions;
/// let opts = AskOptions { top_k: Some(8) };
/// assert_eq!(opts.top_k, Some(8));
/// ```
#[derive(Clone, Debug, Default)]
pub struct AskOptions {
    /// Chunks retrieved for the prompt. `None` uses `RAG_TOP_K`.
    pub top_k: Option<usize>,
}

/// A compact record of a context chunk that was fed to the LLM.
#[derive(Clone, Debug, Serialize)]
pub struct UsedChunk {
    pub ordinal: usize,
    pub score: f32,
    /// Clamped chunk text.
    pub preview: String,
}

/// Names of the services behind an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EngineCaption {
    pub chat_model: String,
    pub embedding_model: String,
    /// Vector index kind, e.g. `flat/euclid`.
    pub index: String,
}

/// Final answer together with the context passed to the model.
#[derive(Clone, Debug, Serialize)]
pub struct QaAnswer {
    /// Model output, verbatim.
    pub answer: String,
    pub context: Vec<UsedChunk>,
    pub engine: EngineCaption,
}

/// What the last processed upload produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub file_name: String,
    pub pages: usize,
    /// 1-based numbers of pages without extractable text.
    pub empty_pages: Vec<u32>,
    /// Extracted text length in characters.
    pub chars: usize,
    pub chunks: usize,
    /// `false` when the text produced no chunks and no index was built.
    pub indexed: bool,
}

/// A gating condition that stops an action without being an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advisory {
    MissingCredential,
    MissingDocument,
    EmptyQuestion,
    NoExtractableText,
}

impl Advisory {
    pub fn code(self) -> &'static str {
        match self {
            Advisory::MissingCredential => "MISSING_CREDENTIAL",
            Advisory::MissingDocument => "MISSING_DOCUMENT",
            Advisory::EmptyQuestion => "EMPTY_QUESTION",
            Advisory::NoExtractableText => "NO_EXTRACTABLE_TEXT",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Advisory::MissingCredential => "Enter your OpenAI API key to continue.",
            Advisory::MissingDocument => "Upload a PDF file to start the analysis.",
            Advisory::EmptyQuestion => "Write a question about the document.",
            Advisory::NoExtractableText => {
                "The document has no extractable text, so there is nothing to search."
            }
        }
    }
}

impl Serialize for Advisory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Advisory", 2)?;
        s.serialize_field("code", self.code())?;
        s.serialize_field("message", self.message())?;
        s.end()
    }
}

/// Result of a gated action: either it ran, or an advisory stopped it.
#[derive(Clone, Debug)]
pub enum Outcome<T> {
    Ready(T),
    Advisory(Advisory),
}

impl<T> Outcome<T> {
    pub fn advisory(&self) -> Option<Advisory> {
        match self {
            Outcome::Ready(_) => None,
            Outcome::Advisory(a) => Some(*a),
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(v) => Some(v),
            Outcome::Advisory(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisory_serializes_code_and_message() {
        let v = serde_json::to_value(Advisory::MissingCredential).unwrap();
        assert_eq!(v["code"], "MISSING_CREDENTIAL");
        assert!(v["message"].as_str().unwrap().contains("API key"));
    }
}
