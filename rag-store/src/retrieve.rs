//! Retrieval: embed the question and search the document index.

use tracing::trace;

use crate::{
    embed::EmbeddingsProvider,
    errors::RagError,
    index::VectorIndex,
    record::{RagHit, RagQuery},
};

/// Embeds the query text and returns the `top_k` closest chunks.
///
/// # Errors
/// Returns embedding/provider errors or a dimension mismatch.
pub async fn rag_context(
    index: &VectorIndex,
    query: RagQuery<'_>,
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<RagHit>, RagError> {
    trace!("retrieve::rag_context top_k={}", query.top_k);

    let qv = provider.embed_one(query.text).await?;
    let hits = index.search(&qv, query.top_k)?;

    trace!("retrieve::rag_context hits={}", hits.len());
    Ok(hits)
}
