//! High-level RAG facade: PDF text in, ranked chunks out.
//!
//! This crate provides a small API to:
//! - Extract text from an uploaded PDF
//! - Split it into overlapping chunks and embed them into an in-memory index
//! - Retrieve the top-K chunks for a textual query
//!
//! The design is flat and splits responsibilities into focused modules.

mod chunker;
mod config;
mod embed;
mod embed_pool;
mod errors;
mod index;
mod loader;
mod record;
mod retrieve;

pub use chunker::TextChunker;
pub use config::{ChunkingConfig, DistanceKind, RagConfig};
pub use embed::{EmbedFuture, EmbeddingsProvider};
pub use errors::RagError;
pub use index::VectorIndex;
pub use loader::{extract_pdf_text, load_pdf};
pub use record::{Chunk, PdfText, RagHit, RagQuery, clamp_snippet};

use tracing::{info, trace};

/// Entry point wiring configuration, chunker and index building.
///
/// Holds no document state; the built [`VectorIndex`] is returned to the
/// caller, which owns it for the lifetime of a session.
#[derive(Clone, Debug)]
pub struct RagStore {
    cfg: RagConfig,
    chunker: TextChunker,
}

impl RagStore {
    /// # Errors
    /// Returns `RagError::Config` for invalid configuration.
    pub fn new(cfg: RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;
        trace!(
            "RagStore::new chunk_size={} overlap={} distance={}",
            cfg.chunking.chunk_size,
            cfg.chunking.chunk_overlap,
            cfg.distance.as_str()
        );
        let chunker = TextChunker::new(cfg.chunking.clone())?;
        Ok(Self { cfg, chunker })
    }

    pub fn config(&self) -> &RagConfig {
        &self.cfg
    }

    /// Splits document text into chunks.
    pub fn split(&self, text: &str) -> Vec<Chunk> {
        self.chunker.split(text)
    }

    /// Embeds `chunks` and builds a searchable index over them.
    ///
    /// # Errors
    /// Returns provider failures, count/dimension mismatches, or
    /// `RagError::EmptyIndex` for zero chunks.
    pub async fn index_chunks(
        &self,
        chunks: Vec<Chunk>,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<VectorIndex, RagError> {
        if chunks.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        let vectors = embed_pool::embed_chunks(
            &chunks,
            provider,
            self.cfg.embed_batch,
            self.cfg.embed_concurrency,
        )
        .await?;
        let index = VectorIndex::build(chunks, vectors, self.cfg.distance)?;
        info!(chunks = index.len(), dim = index.dim(), "document indexed");
        Ok(index)
    }

    /// Builds RAG context for a textual query.
    ///
    /// # Errors
    /// Returns embedding errors or a dimension mismatch.
    pub async fn rag_context(
        &self,
        index: &VectorIndex,
        query: RagQuery<'_>,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<Vec<RagHit>, RagError> {
        trace!("RagStore::rag_context top_k={}", query.top_k);
        retrieve::rag_context(index, query, provider).await
    }
}
