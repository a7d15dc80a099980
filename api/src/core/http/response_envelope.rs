use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::{Advisory, Outcome, StatusLine};
use serde::Serialize;

/// Universal response envelope for both success and error.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Serialize)]
pub struct ApiError {
    /// Stable, machine-readable error code (e.g. "BAD_REQUEST").
    pub code: &'static str,
    /// Human-friendly error message.
    pub message: String,
    /// Cause chain or per-field hints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiErrorDetail>,
}

#[derive(Default, Serialize)]
pub struct ApiErrorDetail {
    /// Field path like `question`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Optional hint to help the client fix the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// One entry of the error's cause chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl ApiErrorDetail {
    pub fn cause(msg: impl Into<String>) -> Self {
        Self {
            cause: Some(msg.into()),
            ..Self::default()
        }
    }
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Build a success envelope.
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Build an error envelope.
    pub fn error(
        code: &'static str,
        message: impl Into<String>,
        details: Vec<ApiErrorDetail>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
                details,
            }),
        }
    }

    /// Convert to axum Response.
    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Payload of a gated action: its result, or the advisory that stopped it,
/// plus the status lines produced on the way.
#[derive(Serialize)]
pub struct ActionData<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
    pub status: Vec<StatusLine>,
}

impl<T: Serialize> ActionData<T> {
    pub fn from_outcome(outcome: Outcome<T>, status: Vec<StatusLine>) -> Self {
        match outcome {
            Outcome::Ready(v) => Self {
                result: Some(v),
                advisory: None,
                status,
            },
            Outcome::Advisory(a) => Self {
                result: None,
                advisory: Some(a),
                status,
            },
        }
    }
}
