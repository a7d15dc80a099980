//! Seams to the hosted model services.
//!
//! The pipeline only sees these traits; production wires them to
//! [`LlmServiceProfiles`], tests to in-memory fakes.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::{LlmServiceProfiles, OpenAiService};
use rag_store::EmbeddingsProvider;

use crate::{credential::Credential, error::ContextorError};

/// Boxed future returned by [`CompletionProvider`].
pub type CompletionFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>>;

/// Text completion backend.
pub trait CompletionProvider: Send + Sync {
    /// Sends `prompt` as a single user message and returns the answer text.
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a>;
}

impl CompletionProvider for OpenAiService {
    fn complete<'a>(&'a self, prompt: &'a str) -> CompletionFuture<'a> {
        Box::pin(async move { Ok(self.generate(prompt, None).await?) })
    }
}

/// Factory of credential-bound model clients.
pub trait Backends: Send + Sync {
    /// Embedding client bound to `credential`.
    fn embedder(&self, credential: &Credential)
    -> Result<Arc<dyn EmbeddingsProvider>, ContextorError>;

    /// Completion client bound to `credential`.
    fn completer(
        &self,
        credential: &Credential,
    ) -> Result<Arc<dyn CompletionProvider>, ContextorError>;

    /// `(chat model, embedding model)` names for display.
    fn model_names(&self) -> (String, String);
}

impl Backends for LlmServiceProfiles {
    fn embedder(
        &self,
        credential: &Credential,
    ) -> Result<Arc<dyn EmbeddingsProvider>, ContextorError> {
        let client: Arc<dyn EmbeddingsProvider> = self.embedding_client(credential.expose())?;
        Ok(client)
    }

    fn completer(
        &self,
        credential: &Credential,
    ) -> Result<Arc<dyn CompletionProvider>, ContextorError> {
        let client: Arc<dyn CompletionProvider> = self.chat_client(credential.expose())?;
        Ok(client)
    }

    fn model_names(&self) -> (String, String) {
        let (chat, embedding) = self.profiles();
        (chat.model.clone(), embedding.model.clone())
    }
}
