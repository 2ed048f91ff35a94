//! HTTP-level tests for the ingress endpoints, driven through the router
//! without a TCP listener.

mod common;

use axum::http::{header, StatusCode};
use common::{body_bytes, body_json, get, multipart_upload, test_app};
use tower::ServiceExt;

use vietpdf::fingerprint::fingerprint_bytes;
use vietpdf::job::{cached_details, JobRecord, JobStatus};
use vietpdf::store::JobStore;

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_accepts_an_image_and_queues_a_job() {
    let test = test_app();

    let request = multipart_upload("/api/upload", "image", "sample.png", b"image bytes");
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let job_id = body["job_id"].as_str().unwrap().to_string();
    assert!(!job_id.is_empty());
    assert!(body["message"].as_str().unwrap().contains("queued"));

    let record = test.store.get_record(&job_id).await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Queued);

    let published = test.queue.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].job_id, job_id);
}

#[tokio::test]
async fn upload_without_image_field_is_rejected() {
    let test = test_app();

    let request = multipart_upload("/api/upload", "attachment", "sample.png", b"image bytes");
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Image file is required");
    assert!(test.queue.published().is_empty());
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let test = test_app();

    // The test router caps bodies at 1 MiB.
    let oversized = vec![0u8; 2 * 1024 * 1024];
    let request = multipart_upload("/api/upload", "image", "big.png", &oversized);
    let response = test.app.clone().oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
    assert!(test.queue.published().is_empty());
}

#[tokio::test]
async fn upload_matching_the_cache_completes_without_publishing() {
    let test = test_app();

    let fingerprint = fingerprint_bytes(b"image bytes");
    test.store
        .cache_put(&fingerprint, "/pdfs/earlier.pdf", common::JOB_TTL)
        .await
        .unwrap();

    let request = multipart_upload("/api/upload", "image", "sample.png", b"image bytes");
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let job_id = body["job_id"].as_str().unwrap();

    let record = test.store.get_record(job_id).await.unwrap().unwrap();
    assert_eq!(record.status, JobStatus::Completed);
    assert!(test.queue.published().is_empty());
}

#[tokio::test]
async fn broker_outage_is_a_server_error() {
    let test = test_app();
    test.queue.set_failing(true);

    let request = multipart_upload("/api/upload", "image", "sample.png", b"image bytes");
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("broker"));
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_of_unknown_job_is_not_found() {
    let test = test_app();
    let response = get(test.app, "/api/status/no-such-job").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn status_of_queued_job_has_no_terminal_fields() {
    let test = test_app();
    test.store
        .put_record("job-1", &JobRecord::queued(), common::JOB_TTL)
        .await
        .unwrap();

    let response = get(test.app, "/api/status/job-1").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["job_id"], "job-1");
    assert_eq!(body["status"], "queued");
    assert!(body.get("pdf_path").is_none());
    assert!(body.get("cached").is_none());
    assert!(body.get("error_message").is_none());
}

#[tokio::test]
async fn status_of_completed_job_includes_details() {
    let test = test_app();
    let record = JobRecord::completed("/pdfs/job-2.pdf", cached_details("/pdfs/job-2.pdf"));
    test.store
        .put_record("job-2", &record, common::JOB_TTL)
        .await
        .unwrap();

    let response = get(test.app, "/api/status/job-2").await;
    let body = body_json(response).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["pdf_path"], "/pdfs/job-2.pdf");
    assert_eq!(body["cached"], true);
}

#[tokio::test]
async fn status_of_failed_job_carries_the_error_message() {
    let test = test_app();
    let record = JobRecord::failed("OCR error: no text recognized in image");
    test.store
        .put_record("job-3", &record, common::JOB_TTL)
        .await
        .unwrap();

    let response = get(test.app, "/api/status/job-3").await;
    let body = body_json(response).await;
    assert_eq!(body["status"], "failed");
    assert!(body["error_message"].as_str().unwrap().contains("OCR"));
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn download_of_unknown_job_is_not_found() {
    let test = test_app();
    let response = get(test.app, "/api/download/no-such-job").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_before_completion_is_rejected_with_current_status() {
    let test = test_app();
    test.store
        .put_record("job-4", &JobRecord::processing(), common::JOB_TTL)
        .await
        .unwrap();

    let response = get(test.app, "/api/download/job-4").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Job not completed");
    assert_eq!(body["status"], "processing");
}

#[tokio::test]
async fn download_of_failed_job_carries_the_error_message() {
    let test = test_app();
    test.store
        .put_record(
            "job-5",
            &JobRecord::failed("Translation error: request timed out"),
            common::JOB_TTL,
        )
        .await
        .unwrap();

    let response = get(test.app, "/api/download/job-5").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["status"], "failed");
    assert!(body["error_message"]
        .as_str()
        .unwrap()
        .contains("Translation error"));
}

#[tokio::test]
async fn download_streams_the_artifact_as_an_attachment() {
    let test = test_app();

    let artifact = test.temp.path().join("job-6.pdf");
    std::fs::write(&artifact, b"%PDF-1.4\nvi: hello\n%%EOF\n").unwrap();

    let path = artifact.display().to_string();
    test.store
        .put_record(
            "job-6",
            &JobRecord::completed(&path, cached_details(&path)),
            common::JOB_TTL,
        )
        .await
        .unwrap();

    let response = get(test.app, "/api/download/job-6").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap(),
        "attachment; filename=\"job-6.pdf\""
    );

    let bytes = body_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF"));
}
