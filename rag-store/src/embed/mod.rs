//! Embedding abstraction.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::OpenAiService;

use crate::errors::RagError;

/// Boxed future returned by [`EmbeddingsProvider`].
pub type EmbedFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, RagError>> + Send + 'a>>;

/// Provider interface for embedding generation.
///
/// Async because real providers perform HTTP requests. Implementations must
/// return one vector per input, in input order.
pub trait EmbeddingsProvider: Send + Sync {
    /// Embeds a batch of texts.
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a>;

    /// Embeds a single text (e.g. a question).
    fn embed_one<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
        Box::pin(async move {
            let input = [text.to_string()];
            let mut out = self.embed_batch(&input).await?;
            if out.len() != 1 {
                return Err(RagError::EmbeddingCountMismatch {
                    got: out.len(),
                    want: 1,
                });
            }
            Ok(out.remove(0))
        })
    }
}

impl EmbeddingsProvider for OpenAiService {
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a> {
        Box::pin(async move { Ok(self.embeddings_batch(texts).await?) })
    }
}

impl<T: EmbeddingsProvider + ?Sized> EmbeddingsProvider for Arc<T> {
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a> {
        (**self).embed_batch(texts)
    }
}
