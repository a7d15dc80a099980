//! OpenAI-compatible LLM access shared by the RAG pipeline.
//!
//! - [`config`]: model profiles (`chat`, `embedding`) loaded from environment
//! - [`services::open_ai_service`]: HTTP client for chat completions and embeddings
//! - [`service_profiles`]: per-credential client cache on top of the profiles
//! - [`telemetry`]: library-scoped tracing layer

pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::llm_model_config::LlmModelConfig;
pub use error_handler::{AiLlmError, ConfigError, ProviderError};
pub use service_profiles::LlmServiceProfiles;
pub use services::open_ai_service::OpenAiService;
