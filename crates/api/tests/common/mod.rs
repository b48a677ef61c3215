#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use onboard_api::config::ServerConfig;
use onboard_api::router::build_app_router;
use onboard_api::state::AppState;
use onboard_core::PreviewEditPolicy;

/// Upload limit used by the test configuration.
pub const TEST_MAX_UPLOAD_BYTES: usize = 4 * 1024;

pub const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// A router wired to temporary storage directories.
///
/// The directories live as long as this value.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: TempDir,
    pub submissions_dir: TempDir,
}

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(upload_dir: &TempDir, submissions_dir: &TempDir) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: upload_dir.path().to_path_buf(),
        max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        submit_url: None,
        submissions_dir: submissions_dir.path().to_path_buf(),
        preview_edit_policy: PreviewEditPolicy::Trusted,
        session_idle_timeout_secs: 0,
    }
}

/// Build the full application router with default test settings.
pub fn build_test_app() -> TestApp {
    build_test_app_with(|_| {})
}

/// Build the full application router after adjusting the test config.
///
/// Uses the same [`build_app_router`] as `main.rs` so integration tests
/// exercise the production middleware stack.
pub fn build_test_app_with(adjust: impl FnOnce(&mut ServerConfig)) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let submissions_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&upload_dir, &submissions_dir);
    adjust(&mut config);

    let state = AppState::new(config.clone()).unwrap();
    let router = build_app_router(state.clone(), &config).unwrap();

    TestApp {
        router,
        state,
        upload_dir,
        submissions_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str) -> Response {
    let request = Request::delete(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post(app: &Router, uri: &str) -> Response {
    let request = Request::post(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response {
    let request = Request::put(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Build a single-part `multipart/form-data` request.
pub fn multipart_request(
    uri: &str,
    part_name: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> Request<Body> {
    let boundary = "onboard-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{part_name}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

// ---------------------------------------------------------------------------
// Wizard helpers
// ---------------------------------------------------------------------------

pub fn session_uri(id: &str, suffix: &str) -> String {
    format!("/api/v1/wizard-sessions/{id}{suffix}")
}

/// Create a session and return its id.
pub async fn create_session(app: &Router) -> String {
    let response = post(app, "/api/v1/wizard-sessions").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().unwrap().to_string()
}

pub async fn snapshot(app: &Router, id: &str) -> Value {
    let response = get(app, &session_uri(id, "")).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

pub async fn set_fields(app: &Router, id: &str, fields: Value) -> Response {
    put_json(app, &session_uri(id, "/fields"), json!({ "fields": fields })).await
}

pub async fn advance(app: &Router, id: &str) -> Response {
    post(app, &session_uri(id, "/advance")).await
}

pub fn basic_info() -> Value {
    json!({
        "fullName": "Alice Cooper",
        "username": "alice_99",
        "email": "a@b.com",
        "mobile": "9876543210",
        "gender": "F",
    })
}

/// Profile step values with an already-stored image reference.
pub fn profile() -> Value {
    json!({
        "profilePic": "/uploads/existing.png",
        "dateOfBirth": "1990-05-17",
        "bio": "Gardener and amateur astronomer.",
    })
}

pub fn address() -> Value {
    json!({
        "addressLine": "221B Baker Street",
        "city": "Pune",
        "state": "Maharashtra",
        "country": "India",
        "postalCode": "411001",
    })
}

/// Fill and advance through the three data steps, ending on the preview.
pub async fn walk_to_preview(app: &Router, id: &str) {
    for fields in [basic_info(), profile(), address()] {
        assert_eq!(set_fields(app, id, fields).await.status(), StatusCode::OK);
        assert_eq!(advance(app, id).await.status(), StatusCode::OK);
    }
    assert_eq!(snapshot(app, id).await["currentStep"], 4);
}

/// A payload that sniffs as PNG.
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.resize(len.max(PNG_SIGNATURE.len()), 0);
    bytes
}

/// Poll the session until the upload is no longer in flight.
pub async fn wait_for_upload(app: &Router, id: &str) -> Value {
    for _ in 0..200 {
        let data = snapshot(app, id).await;
        if data["uploadStatus"] != "uploading" {
            return data;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("upload for session {id} did not finish");
}
