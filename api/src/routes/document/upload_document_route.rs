//! POST /api/session/{id}/document: uploads and processes a PDF.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use contextor::{DocumentSummary, Outcome, StatusLog};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    core::{
        app_state::AppState,
        http::response_envelope::{ActionData, ApiResponse},
    },
    error_handler::{AppError, AppResult},
};

/// Multipart field carrying the PDF.
const FILE_FIELD: &str = "file";

struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// Handler: POST /api/session/{id}/document (multipart, field `file`)
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8501/api/session/$ID/document \
///   -F 'file=@report.pdf;type=application/pdf'
/// ```
#[instrument(skip(state, multipart), fields(session = %id))]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<ActionData<DocumentSummary>>>> {
    let mut session = state.sessions.acquire(id).await?;
    if let Some(advisory) = state.engine.upload_advisory(&session) {
        debug!(code = advisory.code(), "upload gated");
        return Ok(Json(ApiResponse::success(ActionData::from_outcome(
            Outcome::Advisory(advisory),
            Vec::new(),
        ))));
    }
    let upload = read_pdf_field(&mut multipart).await?;
    debug!(file = %upload.file_name, bytes = upload.bytes.len(), "upload received");

    let status = StatusLog::new();
    let outcome = state
        .engine
        .process_document(&mut session, &upload.file_name, upload.bytes, &status)
        .await?;

    Ok(Json(ApiResponse::success(ActionData::from_outcome(
        outcome,
        status.into_lines(),
    ))))
}

async fn read_pdf_field(multipart: &mut Multipart) -> AppResult<Upload> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("document.pdf")
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        if bytes.is_empty() {
            return Err(AppError::BadRequest("uploaded file is empty".into()));
        }
        if !looks_like_pdf(&file_name, content_type.as_deref(), &bytes) {
            return Err(AppError::BadRequest(format!(
                "`{file_name}` is not a PDF file"
            )));
        }
        return Ok(Upload {
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Err(AppError::BadRequest(format!(
        "multipart field `{FILE_FIELD}` is required"
    )))
}

fn looks_like_pdf(file_name: &str, content_type: Option<&str>, bytes: &[u8]) -> bool {
    file_name.to_ascii_lowercase().ends_with(".pdf")
        || content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"))
        || bytes.starts_with(b"%PDF")
}
