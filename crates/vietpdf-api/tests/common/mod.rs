//! Helpers for HTTP-level tests: an app wired to in-memory fakes, plus
//! request/response shorthand around `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use vietpdf::broker::MemoryJobQueue;
use vietpdf::config::HttpConfig;
use vietpdf::intake::Intake;
use vietpdf::store::MemoryJobStore;

use vietpdf_api::{router, AppState};

pub const JOB_TTL: Duration = Duration::from_secs(60);

pub struct TestApp {
    pub app: Router,
    pub store: MemoryJobStore,
    pub queue: MemoryJobQueue,
    pub temp: TempDir,
}

pub fn test_app() -> TestApp {
    let temp = TempDir::new().expect("failed to create temp directory");
    let store = MemoryJobStore::new();
    let queue = MemoryJobQueue::new();

    let intake = Intake::new(
        store.clone(),
        queue.clone(),
        temp.path().join("uploads"),
        JOB_TTL,
    );
    let state = AppState::new(intake, store.clone());

    let http = HttpConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        max_upload_bytes: 1024 * 1024,
        cors_origins: vec![],
    };

    TestApp {
        app: router(state, &http),
        store,
        queue,
        temp,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("failed to build request"),
    )
    .await
    .expect("request failed")
}

/// Builds a multipart upload request with a single file field.
pub fn multipart_upload(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "test-boundary-7MA4YWxkTrZu0gW";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("failed to build multipart request")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is not JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes()
        .to_vec()
}
