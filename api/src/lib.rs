//! HTTP surface of the PDF RAG analyzer.
//!
//! Serves the single-page UI at `/` and the JSON API it talks to. All
//! per-user state lives in the session registry held by [`AppState`].

pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use tokio::{signal, time::MissedTickBehavior};
use tracing::{error, info};

pub use crate::core::app_state::{AppConfig, AppState, ConfigError};
pub use crate::error_handler::AppError;

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        ask::ask_question_route::ask_question,
        document::upload_document_route::upload_document,
        page_route::{healthz, index_page},
        session::session_route::{create_session, delete_session, get_session, set_credential},
    },
};

/// Loads configuration, binds `API_ADDRESS` and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let state = Arc::new(AppState::from_env()?);
    let address = state.config.address.clone();
    let state_for_sweep = state.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!(%address, "listening");

    let sweeper = tokio::spawn(sweep_sessions(state_for_sweep));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    sweeper.abort();
    info!("server stopped");
    Ok(())
}

/// Builds the application router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(index_page))
        .route("/healthz", get(healthz))
        .route("/api/session", post(create_session))
        .route(
            "/api/session/{id}",
            get(get_session).delete(delete_session),
        )
        .route("/api/session/{id}/credential", put(set_credential))
        .route(
            "/api/session/{id}/document",
            post(upload_document).layer(upload_limit),
        )
        .route("/api/session/{id}/ask", post(ask_question))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Expires idle sessions once a minute.
async fn sweep_sessions(state: Arc<AppState>) {
    let mut tick = tokio::time::interval(Duration::from_secs(60));
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tick.tick().await;
        state.sessions.sweep(Instant::now()).await;
    }
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::Response,
    };
    use contextor::{
        Backends, CompletionFuture, CompletionProvider, ContextorConfig, ContextorError,
        Credential, QaEngine,
    };
    use rag_store::{EmbedFuture, EmbeddingsProvider};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const ANSWER: &str = "Mocked answer from the model.";

    struct Embedder;

    impl EmbeddingsProvider for Embedder {
        fn embed_batch<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a> {
            Box::pin(async move {
                Ok(texts
                    .iter()
                    .map(|t| vec![t.len() as f32, 1.0])
                    .collect())
            })
        }
    }

    struct Completer;

    impl CompletionProvider for Completer {
        fn complete<'a>(&'a self, _prompt: &'a str) -> CompletionFuture<'a> {
            Box::pin(async { Ok(ANSWER.to_string()) })
        }
    }

    #[derive(Default)]
    struct FakeBackends {
        calls: AtomicUsize,
    }

    impl Backends for FakeBackends {
        fn embedder(
            &self,
            _c: &Credential,
        ) -> Result<Arc<dyn EmbeddingsProvider>, ContextorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Embedder))
        }

        fn completer(
            &self,
            _c: &Credential,
        ) -> Result<Arc<dyn CompletionProvider>, ContextorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Completer))
        }

        fn model_names(&self) -> (String, String) {
            ("gpt-4o".into(), "text-embedding-ada-002".into())
        }
    }

    fn state_with(default_key: Option<&str>, backends: Arc<FakeBackends>) -> Arc<AppState> {
        let config = AppConfig {
            default_credential: default_key.and_then(Credential::new),
            max_upload_bytes: 64 * 1024,
            ..AppConfig::default()
        };
        let engine = QaEngine::new(ContextorConfig::default(), backends).unwrap();
        Arc::new(AppState::new(config, engine))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Response) {
        let res = app.clone().oneshot(req).await.unwrap();
        (res.status(), res)
    }

    async fn json_body(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart(uri: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn new_session(app: &Router) -> String {
        let (status, res) = send(
            app,
            Request::post("/api/session").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        json_body(res).await["data"]["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// One-page PDF with `text` drawn in Courier.
    fn fixture_pdf(text: &str) -> Vec<u8> {
        use lopdf::{
            Document, Object, Stream,
            content::{Content, Operation},
            dictionary,
        };

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[tokio::test]
    async fn health_and_page() {
        let app = router(state_with(None, Arc::default()));

        let (status, res) = send(&app, Request::get("/healthz").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(res).await, json!({ "status": "ok" }));

        let (status, res) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        let html = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&html).contains("RAG"));
    }

    #[tokio::test]
    async fn session_seeded_from_default_key_never_leaks_it() {
        let app = router(state_with(Some("sk-default-key-4321"), Arc::default()));
        let id = new_session(&app).await;

        let (status, res) = send(
            &app,
            Request::get(format!("/api/session/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["data"]["has_credential"], true);
        assert_eq!(body["data"]["credential_hint"], "sk-…4321");
        assert!(!body.to_string().contains("default-key"));
    }

    #[tokio::test]
    async fn unknown_session_is_404_envelope() {
        let app = router(state_with(None, Arc::default()));
        let uri = format!("/api/session/{}/ask", uuid::Uuid::new_v4());
        let (status, res) = send(&app, post_json(&uri, json!({ "question": "hi" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body = json_body(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "SESSION_NOT_FOUND");
    }

    #[tokio::test]
    async fn advisories_gate_without_backend_calls() {
        let fakes = Arc::new(FakeBackends::default());
        let app = router(state_with(None, fakes.clone()));
        let id = new_session(&app).await;

        let (status, res) = send(
            &app,
            post_json(&format!("/api/session/{id}/ask"), json!({ "question": "What?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["advisory"]["code"], "MISSING_CREDENTIAL");

        let (status, res) = send(
            &app,
            multipart(
                &format!("/api/session/{id}/document"),
                "doc.pdf",
                "application/pdf",
                &fixture_pdf("hello"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json_body(res).await["data"]["advisory"]["code"],
            "MISSING_CREDENTIAL"
        );

        let req = Request::put(format!("/api/session/{id}/credential"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "api_key": "sk-user-key-0001" }).to_string()))
            .unwrap();
        let (status, res) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(res).await["data"]["has_credential"], true);

        let (_, res) = send(
            &app,
            post_json(&format!("/api/session/{id}/ask"), json!({ "question": "What?" })),
        )
        .await;
        assert_eq!(
            json_body(res).await["data"]["advisory"]["code"],
            "MISSING_DOCUMENT"
        );
        assert_eq!(fakes.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upload_then_ask_returns_mocked_answer() {
        let app = router(state_with(Some("sk-test-key-9999"), Arc::default()));
        let id = new_session(&app).await;

        let (status, res) = send(
            &app,
            multipart(
                &format!("/api/session/{id}/document"),
                "report.pdf",
                "application/pdf",
                &fixture_pdf("The launch is planned for March."),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(res).await;
        let summary = &body["data"]["result"];
        assert_eq!(summary["file_name"], "report.pdf");
        assert_eq!(summary["pages"], 1);
        assert_eq!(summary["chunks"], 1);
        assert_eq!(summary["indexed"], true);
        assert!(summary["chars"].as_u64().unwrap() > 0);
        assert!(!body["data"]["status"].as_array().unwrap().is_empty());

        let (status, res) = send(
            &app,
            post_json(
                &format!("/api/session/{id}/ask"),
                json!({ "question": "When is the launch?", "top_k": 2 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(res).await;
        let qa = &body["data"]["result"];
        assert_eq!(qa["answer"], ANSWER);
        assert_eq!(qa["engine"]["chat_model"], "gpt-4o");
        assert_eq!(qa["engine"]["index"], "flat/euclid");
        assert_eq!(qa["context"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bad_uploads_are_rejected() {
        let app = router(state_with(Some("sk-test-key-9999"), Arc::default()));
        let id = new_session(&app).await;
        let uri = format!("/api/session/{id}/document");

        let (status, res) = send(&app, multipart(&uri, "notes.txt", "text/plain", b"hello")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"]["code"], "BAD_REQUEST");

        let (status, res) = send(
            &app,
            multipart(&uri, "broken.pdf", "application/pdf", b"%PDF-1.4 truncated"),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(res).await;
        assert_eq!(body["error"]["code"], "PDF_UNREADABLE");
        assert!(!body["error"]["details"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_action_on_same_session_is_busy() {
        let state = state_with(Some("sk-test-key-9999"), Arc::default());
        let app = router(state.clone());
        let id = new_session(&app).await;

        let parsed: uuid::Uuid = id.parse().unwrap();
        let _held = state.sessions.acquire(parsed).await.unwrap();

        let (status, res) = send(
            &app,
            post_json(&format!("/api/session/{id}/ask"), json!({ "question": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json_body(res).await["error"]["code"], "SESSION_BUSY");
    }

    #[tokio::test]
    async fn malformed_json_is_mapped_into_envelope() {
        let app = router(state_with(None, Arc::default()));
        let id = new_session(&app).await;

        let req = Request::post(format!("/api/session/{id}/ask"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"question\": "))
            .unwrap();
        let (status, res) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(res.headers().contains_key("X-Request-Id"));
        let body = json_body(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn delete_forgets_session() {
        let app = router(state_with(None, Arc::default()));
        let id = new_session(&app).await;

        let (status, res) = send(
            &app,
            Request::delete(format!("/api/session/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(res).await["data"]["cleared"], true);

        let (status, _) = send(
            &app,
            Request::get(format!("/api/session/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn upload_without_credential_is_gated_before_parsing() {
        let fakes = Arc::new(FakeBackends::default());
        let app = router(state_with(None, fakes.clone()));
        let id = new_session(&app).await;

        let (status, res) = send(
            &app,
            multipart(
                &format!("/api/session/{id}/document"),
                "notes.txt",
                "text/plain",
                b"hello",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["advisory"]["code"], "MISSING_CREDENTIAL");
        assert_eq!(fakes.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_upload_is_413() {
        let app = router(state_with(Some("sk-test-key-9999"), Arc::default()));
        let id = new_session(&app).await;

        let mut big = b"%PDF-1.4\n".to_vec();
        big.resize(128 * 1024, b'x');
        let (status, res) = send(
            &app,
            multipart(
                &format!("/api/session/{id}/document"),
                "big.pdf",
                "application/pdf",
                &big,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(res).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn page_reloads_do_not_accumulate_sessions() {
        let state = state_with(None, Arc::default());
        let app = router(state.clone());

        let (_, res) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        let html = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8_lossy(&html);
        assert!(html.contains("sessionStorage"));
        assert!(html.contains("method: \"DELETE\""));

        // Each load deletes the stored session, then opens a fresh one.
        let mut previous: Option<String> = None;
        for _ in 0..5 {
            if let Some(id) = previous.take() {
                let (status, _) = send(
                    &app,
                    Request::delete(format!("/api/session/{id}")).body(Body::empty()).unwrap(),
                )
                .await;
                assert_eq!(status, StatusCode::OK);
            }
            previous = Some(new_session(&app).await);
        }
        assert_eq!(state.sessions.len().await, 1);
    }
}
