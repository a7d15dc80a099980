//! Typed error for the contextor crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Errors from the underlying rag-store crate (PDF, index, embeddings).
    #[error("RAG error: {0}")]
    Rag(#[from] rag_store::RagError),

    /// Errors from the hosted model client.
    #[error("LLM error: {0}")]
    Llm(#[from] ai_llm_service::AiLlmError),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),
}
