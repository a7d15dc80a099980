use serde::Deserialize;

/// Request payload for `POST /api/session/{id}/ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    pub question: String,
    /// Optional override of the number of retrieved chunks.
    #[serde(default)]
    pub top_k: Option<usize>,
}
