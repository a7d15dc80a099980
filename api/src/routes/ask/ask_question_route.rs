//! POST /api/session/{id}/ask: answers a question from the session's PDF.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use contextor::{AskOptions, QaAnswer, StatusLog};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    core::{
        app_state::AppState,
        http::response_envelope::{ActionData, ApiResponse},
    },
    error_handler::AppResult,
    routes::ask::ask_request::AskRequest,
};

/// Handler: POST /api/session/{id}/ask
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8501/api/session/$ID/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is the main goal of the text?","top_k":4}'
/// ```
#[instrument(skip(state, body), fields(session = %id))]
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<AskRequest>,
) -> AppResult<Json<ApiResponse<ActionData<QaAnswer>>>> {
    let session = state.sessions.acquire(id).await?;
    let status = StatusLog::new();

    let outcome = state
        .engine
        .ask(
            &session,
            &body.question,
            AskOptions { top_k: body.top_k },
            &status,
        )
        .await?;

    Ok(Json(ApiResponse::success(ActionData::from_outcome(
        outcome,
        status.into_lines(),
    ))))
}
