use axum::{Json, response::Html};
use serde_json::{Value, json};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// Handler: GET /
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handler: GET /healthz
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
