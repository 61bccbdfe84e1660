//! Router-level test harness: real store and upload dir in a temp directory,
//! a recording mailer in place of SMTP.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::{
    create_app,
    db::{DbConfig, Store},
    mail::tests::RecordingMailer,
    secret::DeleteSecret,
    state::AppState,
    uploads::UploadDir,
};

pub(crate) const SECRET: &str = "skyman";
const BOUNDARY: &str = "----portfolio-test-boundary";

pub(crate) struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    _dir: TempDir,
}

pub(crate) async fn test_app() -> TestApp {
    test_app_with_mailer(false).await
}

pub(crate) async fn test_app_with_mailer(fail: bool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("portfolio.db").display());
    let store = Store::open(&DbConfig::for_url(url)).await.unwrap();
    let uploads = UploadDir::provision(dir.path().join("uploads")).await.unwrap();

    let mailer = Arc::new(RecordingMailer {
        fail,
        ..Default::default()
    });
    let state = AppState::new(
        store,
        uploads,
        mailer.clone(),
        Some(DeleteSecret::Plain(SECRET.to_string())),
    );
    let app = create_app(state.clone(), &["http://localhost:5173".to_string()]);

    TestApp {
        app,
        state,
        mailer,
        _dir: dir,
    }
}

pub(crate) async fn send_bytes(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

/// Non-JSON or empty bodies come back as `Value::Null`.
pub(crate) async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send_bytes(app, req).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub(crate) fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub(crate) struct FilePart {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub(crate) fn multipart_request(
    uri: &str,
    file: Option<FilePart>,
    category: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();

    if let Some(category) = category {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\n{category}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.filename, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file.bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    // Browsers always announce the length of a FormData body.
    Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap()
}
