use std::error::Error as _;

use ai_llm_service::{AiLlmError, ProviderError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use rag_store::RagError;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::core::{
    app_state::ConfigError,
    http::response_envelope::{ApiErrorDetail, ApiResponse},
};

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    #[error("session {0} is busy with another request")]
    SessionBusy(Uuid),

    // --- Pipeline ---
    #[error("{0}")]
    Engine(#[from] ContextorError),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            AppError::SessionBusy(_) => (StatusCode::CONFLICT, "SESSION_BUSY"),
            AppError::Engine(e) => engine_status(e),
        }
    }

    /// Messages of every error in the `source()` chain.
    fn cause_chain(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut cur = self.source();
        while let Some(e) = cur {
            out.push(e.to_string());
            cur = e.source();
        }
        out
    }
}

fn engine_status(err: &ContextorError) -> (StatusCode, &'static str) {
    match err {
        ContextorError::Rag(rag) => rag_status(rag),
        ContextorError::Llm(llm) => llm_status(llm),
        ContextorError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

fn rag_status(err: &RagError) -> (StatusCode, &'static str) {
    match err {
        RagError::Pdf(_) | RagError::UnsupportedPdf(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "PDF_UNREADABLE")
        }
        RagError::VectorSizeMismatch { .. } | RagError::EmbeddingCountMismatch { .. } => {
            (StatusCode::BAD_GATEWAY, "EMBEDDING_MISMATCH")
        }
        RagError::Provider(llm) => llm_status(llm),
        RagError::Config(_) | RagError::EmptyIndex | RagError::Join(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    }
}

fn llm_status(err: &AiLlmError) -> (StatusCode, &'static str) {
    if err.is_auth_failure() {
        return (StatusCode::UNAUTHORIZED, "CREDENTIAL_REJECTED");
    }
    if err.is_rate_limited() {
        return (StatusCode::TOO_MANY_REQUESTS, "UPSTREAM_RATE_LIMITED");
    }
    if err.is_timeout() {
        return (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT");
    }
    match err {
        AiLlmError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        AiLlmError::Provider(ProviderError::EmbeddingCount { .. }) => {
            (StatusCode::BAD_GATEWAY, "EMBEDDING_MISMATCH")
        }
        _ => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let chain = self.cause_chain();
        if status.is_server_error() {
            error!(code, error = %self, causes = ?chain, "request failed");
        } else {
            warn!(code, error = %self, "request rejected");
        }

        let details = chain.into_iter().map(ApiErrorDetail::cause).collect();
        ApiResponse::<()>::error(code, self.to_string(), details).into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::BadRequest(err.body_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::error_handler::HttpError;
    use std::time::Duration;

    fn upstream(status: u16) -> AppError {
        let http = HttpError {
            status: StatusCode::from_u16(status).unwrap(),
            url: "http://upstream/v1/embeddings".into(),
            snippet: "nope".into(),
        };
        let llm = AiLlmError::Provider(ProviderError::HttpStatus(http));
        AppError::Engine(ContextorError::Rag(RagError::Provider(llm)))
    }

    #[test]
    fn upstream_statuses_map_to_codes() {
        assert_eq!(
            upstream(401).status_and_code(),
            (StatusCode::UNAUTHORIZED, "CREDENTIAL_REJECTED")
        );
        assert_eq!(
            upstream(403).status_and_code(),
            (StatusCode::UNAUTHORIZED, "CREDENTIAL_REJECTED")
        );
        assert_eq!(
            upstream(429).status_and_code(),
            (StatusCode::TOO_MANY_REQUESTS, "UPSTREAM_RATE_LIMITED")
        );
        assert_eq!(
            upstream(500).status_and_code(),
            (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
        );
    }

    #[test]
    fn timeouts_and_mismatches() {
        let timeout = AppError::Engine(ContextorError::Llm(AiLlmError::Timeout(
            Duration::from_secs(120),
        )));
        assert_eq!(
            timeout.status_and_code(),
            (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT")
        );

        let mismatch = AppError::Engine(ContextorError::Rag(RagError::VectorSizeMismatch {
            got: 3,
            want: 1536,
        }));
        assert_eq!(
            mismatch.status_and_code(),
            (StatusCode::BAD_GATEWAY, "EMBEDDING_MISMATCH")
        );
    }

    #[test]
    fn pdf_errors_are_unprocessable_with_cause_chain() {
        let err = AppError::Engine(ContextorError::Rag(RagError::UnsupportedPdf(
            "encrypted".into(),
        )));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::UNPROCESSABLE_ENTITY, "PDF_UNREADABLE")
        );
        let chain = err.cause_chain();
        assert_eq!(chain.len(), 2);
        assert!(chain[0].starts_with("RAG error"));
        assert_eq!(chain[1], "unsupported pdf: encrypted");
    }

    #[test]
    fn session_errors() {
        let id = Uuid::nil();
        assert_eq!(
            AppError::SessionNotFound(id).status_and_code(),
            (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND")
        );
        assert_eq!(
            AppError::SessionBusy(id).status_and_code(),
            (StatusCode::CONFLICT, "SESSION_BUSY")
        );
    }
}
