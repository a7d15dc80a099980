//! Unified error types for the crate.

use ai_llm_service::AiLlmError;
use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The uploaded bytes are not a readable PDF.
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// The PDF parsed but cannot be used (e.g. encrypted).
    #[error("unsupported pdf: {0}")]
    UnsupportedPdf(String),

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Mismatch in vector dimensionality across records or queries.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Number of vectors differs from the number of chunks.
    #[error("embedding count mismatch: got {got}, want {want}")]
    EmbeddingCountMismatch { got: usize, want: usize },

    /// An index cannot be built from zero chunks.
    #[error("nothing to index")]
    EmptyIndex,

    /// Embedding provider failure.
    #[error("embedding provider error: {0}")]
    Provider(#[from] AiLlmError),

    /// Blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
