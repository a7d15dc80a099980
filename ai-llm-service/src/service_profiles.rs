//! Shared LLM service with two profiles: `chat` and `embedding`.
//!
//! - Construct once at startup, wrap in `Arc`, and pass clones to dependents.
//! - Profiles carry no credential; each call names the credential to use.
//! - Caches underlying HTTP clients per (profile, key) so a session reuses
//!   its connection pool across requests.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::LlmServiceProfiles;
//!
//! # async fn run() -> Result<(), ai_llm_service::AiLlmError> {
//! let svc = Arc::new(LlmServiceProfiles::from_env()?);
//! let answer = svc.chat_client("sk-...")?.generate("Hello world", None).await?;
//! let vectors = svc
//!     .embedding_client("sk-...")?
//!     .embeddings_batch(&["Ferris".to_string()])
//!     .await?;
//! println!("{answer} / dim = {}", vectors[0].len());
//! # Ok(()) }
//! ```

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use tracing::debug;

use crate::{
    config::{
        default_config::{config_openai_chat, config_openai_embedding},
        llm_model_config::LlmModelConfig,
    },
    error_handler::AiLlmError,
    services::open_ai_service::OpenAiService,
};

/// Upper bound of cached clients before the cache is reset.
const MAX_CACHED_CLIENTS: usize = 64;

/// Which profile a client was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProfileRole {
    Chat,
    Embedding,
}

/// Shared service that manages the **chat** and **embedding** profiles.
pub struct LlmServiceProfiles {
    chat: LlmModelConfig,
    embedding: LlmModelConfig,

    clients: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,
}

impl LlmServiceProfiles {
    /// Creates a new service from explicit profiles.
    pub fn new(chat: LlmModelConfig, embedding: LlmModelConfig) -> Self {
        Self {
            chat,
            embedding,
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// Loads both profiles from environment (see `config::default_config`).
    ///
    /// # Errors
    /// Returns [`AiLlmError::Config`] for invalid values.
    pub fn from_env() -> Result<Self, AiLlmError> {
        Ok(Self::new(config_openai_chat()?, config_openai_embedding()?))
    }

    /// Returns references to the current profiles `(chat, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.chat, &self.embedding)
    }

    /// Returns (or builds) the chat client bound to `api_key`.
    ///
    /// # Errors
    /// Propagates client construction errors (missing key, bad endpoint).
    pub fn chat_client(&self, api_key: &str) -> Result<Arc<OpenAiService>, AiLlmError> {
        self.client_for(ProfileRole::Chat, api_key)
    }

    /// Returns (or builds) the embedding client bound to `api_key`.
    pub fn embedding_client(&self, api_key: &str) -> Result<Arc<OpenAiService>, AiLlmError> {
        self.client_for(ProfileRole::Embedding, api_key)
    }

    /// Number of cached clients (for diagnostics).
    pub fn cached_clients(&self) -> usize {
        self.clients.read().map(|m| m.len()).unwrap_or_default()
    }

    /* --------------------- Internals --------------------- */

    fn client_for(&self, role: ProfileRole, api_key: &str) -> Result<Arc<OpenAiService>, AiLlmError> {
        let profile = match role {
            ProfileRole::Chat => &self.chat,
            ProfileRole::Embedding => &self.embedding,
        };
        let cfg = profile.with_api_key(api_key.trim());
        let key = ClientKey::new(role, &cfg);

        if let Some(cli) = self
            .clients
            .read()
            .ok()
            .and_then(|m| m.get(&key).cloned())
        {
            return Ok(cli);
        }

        // Build outside the lock; a racing builder just loses its client.
        let built = Arc::new(OpenAiService::new(cfg)?);

        let mut w = self
            .clients
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if w.len() >= MAX_CACHED_CLIENTS && !w.contains_key(&key) {
            debug!(cached = w.len(), "client cache full; clearing");
            w.clear();
        }
        Ok(w.entry(key).or_insert(built).clone())
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    role: ProfileRole,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl ClientKey {
    fn new(role: ProfileRole, cfg: &LlmModelConfig) -> Self {
        Self {
            role,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            model: model.into(),
            endpoint: "http://127.0.0.1:9".into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.0),
            top_p: None,
            timeout_secs: Some(5),
        }
    }

    #[test]
    fn clients_are_cached_per_role_and_key() {
        let svc = LlmServiceProfiles::new(profile("chat"), profile("embed"));

        let a = svc.chat_client("sk-a").unwrap();
        let a2 = svc.chat_client(" sk-a ").unwrap();
        assert!(Arc::ptr_eq(&a, &a2));

        let b = svc.chat_client("sk-b").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));

        let e = svc.embedding_client("sk-a").unwrap();
        assert_eq!(e.model(), "embed");
        assert_eq!(svc.cached_clients(), 3);
    }

    #[test]
    fn blank_key_is_rejected_and_not_cached() {
        let svc = LlmServiceProfiles::new(profile("chat"), profile("embed"));
        assert!(svc.chat_client("  ").is_err());
        assert_eq!(svc.cached_clients(), 0);
    }

    #[test]
    fn cache_resets_when_full() {
        let svc = LlmServiceProfiles::new(profile("chat"), profile("embed"));
        for i in 0..MAX_CACHED_CLIENTS {
            svc.chat_client(&format!("sk-{i}")).unwrap();
        }
        assert_eq!(svc.cached_clients(), MAX_CACHED_CLIENTS);
        svc.chat_client("sk-overflow").unwrap();
        assert_eq!(svc.cached_clients(), 1);
    }
}
