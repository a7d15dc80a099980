//! Embedding executor with bounded concurrency and dimension checks.

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::{embed::EmbeddingsProvider, errors::RagError, record::Chunk};

/// Embeds every chunk, `batch` texts per provider call, with at most
/// `concurrency` calls in flight.
///
/// The result holds one vector per chunk, in chunk order, all of the same
/// dimension.
///
/// # Errors
/// - [`RagError::EmbeddingCountMismatch`] if a batch returns the wrong count
/// - [`RagError::VectorSizeMismatch`] if dimensions disagree
/// - [`RagError::Provider`] if the provider fails
pub async fn embed_chunks(
    chunks: &[Chunk],
    provider: &dyn EmbeddingsProvider,
    batch: usize,
    concurrency: usize,
) -> Result<Vec<Vec<f32>>, RagError> {
    if chunks.is_empty() {
        debug!("embed_pool::embed_chunks: nothing to embed");
        return Ok(Vec::new());
    }

    let batches: Vec<Vec<String>> = chunks
        .chunks(batch.max(1))
        .map(|group| group.iter().map(|c| c.text.clone()).collect())
        .collect();
    info!(
        chunks = chunks.len(),
        batches = batches.len(),
        concurrency,
        "embedding chunks"
    );

    // Futures are boxed up front so no closure borrows the provider across
    // an await; `buffered` then keeps batch order while polling concurrently.
    let calls: Vec<_> = batches.iter().map(|texts| provider.embed_batch(texts)).collect();
    let per_batch: Vec<Vec<Vec<f32>>> = stream::iter(calls)
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    for (texts, vectors) in batches.iter().zip(&per_batch) {
        if vectors.len() != texts.len() {
            return Err(RagError::EmbeddingCountMismatch {
                got: vectors.len(),
                want: texts.len(),
            });
        }
    }

    let vectors: Vec<Vec<f32>> = per_batch.into_iter().flatten().collect();
    let want = vectors.first().map(Vec::len).unwrap_or_default();
    if want == 0 {
        return Err(RagError::VectorSizeMismatch { got: 0, want: 1 });
    }
    if let Some(bad) = vectors.iter().find(|v| v.len() != want) {
        return Err(RagError::VectorSizeMismatch {
            got: bad.len(),
            want,
        });
    }

    debug!(vectors = vectors.len(), dim = want, "embeddings ready");
    Ok(vectors)
}
