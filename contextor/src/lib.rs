//! Question answering over one uploaded PDF.
//!
//! [`QaEngine`] runs the two user actions of a session:
//! - [`QaEngine::process_document`]: extract text, chunk, embed, index
//! - [`QaEngine::ask`]: embed the question, retrieve top-K chunks, build a
//!   "stuff" prompt, call the completion model, return its answer verbatim
//!
//! Both actions are gated: a missing credential, document or question yields
//! an [`Advisory`] and no external call is made.

mod api_types;
mod backends;
mod cfg;
mod credential;
mod error;
mod progress;
pub mod prompt;
mod session;

pub use api_types::{
    Advisory, AskOptions, DocumentSummary, EngineCaption, Outcome, QaAnswer, UsedChunk,
};
pub use backends::{Backends, CompletionFuture, CompletionProvider};
pub use cfg::ContextorConfig;
pub use credential::Credential;
pub use error::ContextorError;
pub use progress::{NoopProgress, Progress, StatusLevel, StatusLine, StatusLog};
pub use session::{Session, SessionSnapshot};

use std::sync::Arc;

use rag_store::{PdfText, RagQuery, RagStore, clamp_snippet, load_pdf};
use tracing::{debug, info, warn};

use session::LoadedDocument;

/// Document processing and question answering for sessions.
///
/// Cheap to share behind an `Arc`; holds no per-session state.
pub struct QaEngine {
    store: RagStore,
    backends: Arc<dyn Backends>,
    cfg: ContextorConfig,
}

impl QaEngine {
    /// # Errors
    /// Returns `ContextorError::Rag` for invalid chunking/retrieval config.
    pub fn new(cfg: ContextorConfig, backends: Arc<dyn Backends>) -> Result<Self, ContextorError> {
        let store = RagStore::new(cfg.rag.clone())?;
        Ok(Self {
            store,
            backends,
            cfg,
        })
    }

    pub fn config(&self) -> &ContextorConfig {
        &self.cfg
    }

    /// Models and index behind every answer.
    pub fn caption(&self) -> EngineCaption {
        let (chat_model, embedding_model) = self.backends.model_names();
        EngineCaption {
            chat_model,
            embedding_model,
            index: format!("flat/{}", self.cfg.rag.distance.as_str()),
        }
    }

    /// Advisory that blocks an upload into `session`, checked before the
    /// upload body is even read.
    pub fn upload_advisory(&self, session: &Session) -> Option<Advisory> {
        session
            .credential()
            .is_none()
            .then_some(Advisory::MissingCredential)
    }

    /// Replaces the session's document with the uploaded PDF.
    ///
    /// Without a credential nothing is parsed and the previous document is
    /// kept. Otherwise the previous document is dropped first, so a failed
    /// upload leaves the session without one.
    ///
    /// # Errors
    /// Returns PDF, embedding or index errors.
    pub async fn process_document(
        &self,
        session: &mut Session,
        file_name: &str,
        bytes: Vec<u8>,
        progress: &dyn Progress,
    ) -> Result<Outcome<DocumentSummary>, ContextorError> {
        if let Some(advisory) = self.upload_advisory(session) {
            return Ok(Outcome::Advisory(advisory));
        }
        session.drop_document();

        progress.step("Extracting text from the PDF...");
        let pdf = load_pdf(bytes).await?;
        self.index_text(session, file_name, pdf, progress).await
    }

    /// Chunks, embeds and indexes already extracted text into `session`.
    ///
    /// Text without chunks is stored unindexed and no embedding call is made.
    ///
    /// # Errors
    /// Returns embedding or index errors.
    pub async fn index_text(
        &self,
        session: &mut Session,
        file_name: &str,
        pdf: PdfText,
        progress: &dyn Progress,
    ) -> Result<Outcome<DocumentSummary>, ContextorError> {
        let Some(credential) = session.credential().cloned() else {
            return Ok(Outcome::Advisory(Advisory::MissingCredential));
        };
        session.drop_document();

        let chars = pdf.char_count();
        progress.info(&format!("Extracted text: {chars} characters"));
        if !pdf.empty_pages.is_empty() {
            progress.warning(&format!(
                "{} page(s) had no extractable text",
                pdf.empty_pages.len()
            ));
        }

        let chunks = self.store.split(&pdf.text);
        let mut summary = DocumentSummary {
            file_name: file_name.to_string(),
            pages: pdf.pages,
            empty_pages: pdf.empty_pages,
            chars,
            chunks: chunks.len(),
            indexed: false,
        };

        if chunks.is_empty() {
            warn!(file = file_name, "document has no extractable text; index skipped");
            progress.warning("The document has no extractable text");
            session.document = Some(LoadedDocument {
                summary: summary.clone(),
                index: None,
            });
            return Ok(Outcome::Ready(summary));
        }
        progress.success(&format!("Document split into {} chunks", chunks.len()));

        progress.step("Generating embeddings and the semantic index...");
        let embedder = self.backends.embedder(&credential)?;
        let index = self.store.index_chunks(chunks, &*embedder).await?;
        summary.indexed = true;

        info!(
            file = file_name,
            pages = summary.pages,
            chars,
            chunks = summary.chunks,
            "document ready"
        );
        progress.success("Knowledge base ready");
        session.document = Some(LoadedDocument {
            summary: summary.clone(),
            index: Some(index),
        });
        Ok(Outcome::Ready(summary))
    }

    /// Answers `question` from the session's document.
    ///
    /// Gates, in order: credential, document, non-blank question, indexed
    /// text.
    ///
    /// # Errors
    /// Returns embedding, retrieval or completion errors.
    pub async fn ask(
        &self,
        session: &Session,
        question: &str,
        opts: AskOptions,
        progress: &dyn Progress,
    ) -> Result<Outcome<QaAnswer>, ContextorError> {
        let Some(credential) = session.credential() else {
            return Ok(Outcome::Advisory(Advisory::MissingCredential));
        };
        let Some(document) = session.document.as_ref() else {
            return Ok(Outcome::Advisory(Advisory::MissingDocument));
        };
        let question = question.trim();
        if question.is_empty() {
            return Ok(Outcome::Advisory(Advisory::EmptyQuestion));
        }
        let Some(index) = document.index.as_ref() else {
            return Ok(Outcome::Advisory(Advisory::NoExtractableText));
        };

        let top_k = opts.top_k.filter(|k| *k > 0).unwrap_or(self.cfg.rag.top_k);
        progress.step("Processing your question...");

        let embedder = self.backends.embedder(credential)?;
        let hits = self
            .store
            .rag_context(
                index,
                RagQuery {
                    text: question,
                    top_k,
                },
                &*embedder,
            )
            .await?;
        debug!(top_k, hits = hits.len(), "context retrieved");

        let prompt = prompt::build_stuff_prompt(question, &hits, self.cfg.max_ctx_chars);
        let completer = self.backends.completer(credential)?;
        let answer = completer.complete(&prompt).await?;
        info!(
            hits = hits.len(),
            prompt_chars = prompt.chars().count(),
            answer_chars = answer.chars().count(),
            "question answered"
        );

        let context = hits
            .into_iter()
            .map(|h| UsedChunk {
                ordinal: h.chunk.ordinal,
                score: h.score,
                preview: clamp_snippet(&h.chunk.text, self.cfg.preview_chars),
            })
            .collect();

        Ok(Outcome::Ready(QaAnswer {
            answer,
            context,
            engine: self.caption(),
        }))
    }
}
