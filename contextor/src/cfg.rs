//! Runtime configuration loaded from environment variables.

use rag_store::RagConfig;

use crate::error::ContextorError;

/// Config bag for the engine. All fields have defaults.
#[derive(Clone, Debug)]
pub struct ContextorConfig {
    /// Chunking, embedding and retrieval knobs.
    pub rag: RagConfig,
    /// Character budget of the context block in the prompt.
    pub max_ctx_chars: usize,
    /// Characters of each used chunk echoed back to the caller.
    pub preview_chars: usize,
}

impl Default for ContextorConfig {
    fn default() -> Self {
        Self {
            rag: RagConfig::default(),
            max_ctx_chars: 16_000,
            preview_chars: 800,
        }
    }
}

impl ContextorConfig {
    /// Builds from environment variables (`MAX_CTX_CHARS` plus the
    /// `rag-store` variables).
    ///
    /// # Errors
    /// Returns `ContextorError::Rag`/`Config` for invalid values.
    pub fn from_env() -> Result<Self, ContextorError> {
        let dflt = Self::default();
        let max_ctx_chars = match std::env::var("MAX_CTX_CHARS") {
            Ok(v) if !v.trim().is_empty() => v.trim().parse::<usize>().map_err(|_| {
                ContextorError::Config("MAX_CTX_CHARS must be a non-negative integer".into())
            })?,
            _ => dflt.max_ctx_chars,
        };
        if max_ctx_chars == 0 {
            return Err(ContextorError::Config("MAX_CTX_CHARS must be > 0".into()));
        }
        Ok(Self {
            rag: RagConfig::from_env()?,
            max_ctx_chars,
            ..dflt
        })
    }
}
