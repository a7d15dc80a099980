//! Default LLM profiles loaded from environment variables.
//!
//! Two roles are used by the RAG flow:
//!
//! - **Chat**      → answers a question over retrieved context
//! - **Embedding** → turns chunks and questions into vectors
//!
//! Profiles never carry a key here: the credential belongs to the user
//! session and is attached per request.
//!
//! # Environment variables
//!
//! - `OPENAI_BASE_URL`  = API base (default `https://api.openai.com`)
//! - `CHAT_MODEL`       = completion model (default `gpt-4o`)
//! - `EMBEDDING_MODEL`  = embedding model (default `text-embedding-ada-002`)
//! - `LLM_TEMPERATURE`  = sampling temperature, `0.0..=2.0` (default `0.0`)
//! - `LLM_MAX_TOKENS`   = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS` = per-request timeout (default `120`)

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, env_or, env_parse_or, validate_http_endpoint,
        validate_range_f32,
    },
};

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Resolves and validates the API base URL.
///
/// # Errors
/// - [`ConfigError::InvalidFormat`] if the URL does not use http/https
fn openai_endpoint() -> Result<String, AiLlmError> {
    let url = env_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL);
    validate_http_endpoint("OPENAI_BASE_URL", &url)?;
    Ok(url.trim_end_matches('/').to_string())
}

fn timeout_secs() -> Result<u64, AiLlmError> {
    let secs = env_parse_or("LLM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS, "expected u64 seconds")?;
    if secs == 0 {
        return Err(ConfigError::OutOfRange {
            field: "LLM_TIMEOUT_SECS",
            detail: "must be > 0",
        }
        .into());
    }
    Ok(secs)
}

fn non_empty_model(name: String) -> Result<String, AiLlmError> {
    if name.trim().is_empty() {
        Err(ConfigError::EmptyModel.into())
    } else {
        Ok(name)
    }
}

/// Constructs the **chat** profile used to answer questions.
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic answers)
/// - `timeout_secs = Some(120)`
pub fn config_openai_chat() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = openai_endpoint()?;
    let model = non_empty_model(env_or("CHAT_MODEL", DEFAULT_CHAT_MODEL))?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let temperature: f32 = env_parse_or("LLM_TEMPERATURE", 0.0, "expected f32")?;
    validate_range_f32("LLM_TEMPERATURE", temperature, 0.0, 2.0)?;

    Ok(LlmModelConfig {
        model,
        endpoint,
        api_key: None,
        max_tokens,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(timeout_secs()?),
    })
}

/// Constructs the **embedding** profile used for chunks and questions.
pub fn config_openai_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let endpoint = openai_endpoint()?;
    let model = non_empty_model(env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL))?;

    Ok(LlmModelConfig {
        model,
        endpoint,
        api_key: None,
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(timeout_secs()?),
    })
}
