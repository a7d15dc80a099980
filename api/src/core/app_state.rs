use std::{sync::Arc, time::Duration};

use ai_llm_service::{AiLlmError, LlmServiceProfiles};
use contextor::{ContextorConfig, ContextorError, Credential, QaEngine};
use thiserror::Error;
use tracing::info;

use crate::core::session_registry::{SessionLimits, SessionRegistry};

const DEFAULT_ADDRESS: &str = "127.0.0.1:8501";
const DEFAULT_MAX_UPLOAD_MB: usize = 20;

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber { var: &'static str, reason: String },

    #[error("model service config: {0}")]
    Llm(#[from] AiLlmError),

    #[error("engine config: {0}")]
    Engine(#[from] ContextorError),
}

/// Server knobs read from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Bind address (`API_ADDRESS`).
    pub address: String,
    /// Upload body limit in bytes (`MAX_UPLOAD_MB`).
    pub max_upload_bytes: usize,
    /// Credential new sessions start with (`OPENAI_API_KEY`).
    pub default_credential: Option<Credential>,
    /// Idle expiry (`SESSION_IDLE_MINUTES`) and cap (`MAX_SESSIONS`).
    pub sessions: SessionLimits,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            default_credential: None,
            sessions: SessionLimits::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let address = std::env::var("API_ADDRESS")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

        let max_upload_mb = positive_env("MAX_UPLOAD_MB", DEFAULT_MAX_UPLOAD_MB)?;
        let defaults = SessionLimits::default();
        let idle_minutes = positive_env(
            "SESSION_IDLE_MINUTES",
            (defaults.idle_ttl.as_secs() / 60) as usize,
        )?;
        let sessions = SessionLimits {
            idle_ttl: Duration::from_secs(idle_minutes as u64 * 60),
            max_sessions: positive_env("MAX_SESSIONS", defaults.max_sessions)?,
        };

        Ok(Self {
            address: address.trim().to_string(),
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            default_credential: std::env::var("OPENAI_API_KEY").ok().and_then(Credential::new),
            sessions,
        })
    }
}

/// Reads a `usize > 0` from `var`, falling back to `default` when unset.
fn positive_env(var: &'static str, default: usize) -> Result<usize, ConfigError> {
    let value = match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => {
            v.trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidNumber {
                    var,
                    reason: e.to_string(),
                })?
        }
        _ => default,
    };
    if value == 0 {
        return Err(ConfigError::InvalidNumber {
            var,
            reason: "must be > 0".into(),
        });
    }
    Ok(value)
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub config: AppConfig,
    /// Stateless pipeline shared by every session.
    pub engine: Arc<QaEngine>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: AppConfig, engine: QaEngine) -> Self {
        let sessions = SessionRegistry::new(config.sessions);
        Self {
            config,
            engine: Arc::new(engine),
            sessions,
        }
    }

    /// Loads server, model and engine config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = AppConfig::from_env()?;
        let profiles = Arc::new(LlmServiceProfiles::from_env()?);
        let engine = QaEngine::new(ContextorConfig::from_env()?, profiles)?;

        let caption = engine.caption();
        info!(
            address = %config.address,
            chat_model = %caption.chat_model,
            embedding_model = %caption.embedding_model,
            index = %caption.index,
            default_credential = config.default_credential.is_some(),
            "configuration loaded"
        );
        Ok(Self::new(config, engine))
    }
}
