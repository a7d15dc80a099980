//! Session lifecycle and credential input.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use contextor::{Credential, SessionSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
};

#[derive(Debug, Serialize)]
pub struct CreatedSession {
    pub id: Uuid,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct ClearedSession {
    pub id: Uuid,
    pub cleared: bool,
}

/// Body of `PUT /api/session/{id}/credential`; a blank or missing key clears it.
#[derive(Deserialize)]
pub struct CredentialRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Handler: POST /api/session
#[instrument(skip(state))]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<CreatedSession>>) {
    let credential = state.config.default_credential.clone();
    let snapshot = contextor::Session::new(credential.clone()).snapshot();
    let id = state.sessions.create(credential).await;
    info!(session = %id, seeded = snapshot.has_credential, "session opened");

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(CreatedSession {
            id,
            session: snapshot,
        })),
    )
}

/// Handler: GET /api/session/{id}
#[instrument(skip(state), fields(session = %id))]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SessionSnapshot>>> {
    let session = state.sessions.acquire(id).await?;
    Ok(Json(ApiResponse::success(session.snapshot())))
}

/// Handler: DELETE /api/session/{id}
#[instrument(skip(state), fields(session = %id))]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ClearedSession>>> {
    if !state.sessions.remove(id).await {
        return Err(AppError::SessionNotFound(id));
    }
    info!("session cleared");
    Ok(Json(ApiResponse::success(ClearedSession { id, cleared: true })))
}

/// Handler: PUT /api/session/{id}/credential
#[instrument(skip(state, body), fields(session = %id))]
pub async fn set_credential(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<CredentialRequest>,
) -> AppResult<Json<ApiResponse<SessionSnapshot>>> {
    let mut session = state.sessions.acquire(id).await?;
    let credential = body.api_key.and_then(Credential::new);
    info!(credential = credential.is_some(), "credential updated");
    session.set_credential(credential);
    Ok(Json(ApiResponse::success(session.snapshot())))
}
