use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tokio_util::io::ReaderStream;

use vietpdf::broker::JobQueue;
use vietpdf::job::{
    JobRecord, JobStatus, DETAIL_CACHED, DETAIL_FILTER_MS, DETAIL_OCR_MS, DETAIL_PDF_MS,
    DETAIL_PDF_PATH, DETAIL_TRANSLATE_MS,
};
use vietpdf::store::JobStore;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub job_id: String,
    pub message: &'static str,
}

/// POST /api/upload: accept a multipart image, return a tracked job.
pub async fn upload<S, Q>(
    State(state): State<AppState<S, Q>>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>>
where
    S: JobStore + Clone + Send + Sync + 'static,
    Q: JobQueue + Send + Sync + 'static,
{
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("image") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Unreadable image field: {e}")))?;
            image = Some((filename, bytes));
            break;
        }
    }

    let (filename, bytes) =
        image.ok_or_else(|| ApiError::BadRequest("Image file is required".to_string()))?;

    let outcome = state.intake.accept(&filename, &bytes).await?;
    let message = if outcome.cached {
        "File uploaded successfully. Result available from cache."
    } else {
        "File uploaded successfully. Processing queued."
    };

    Ok(Json(UploadResponse {
        job_id: outcome.job_id,
        message,
    }))
}

/// Projection of a job record for polling clients. Fields that do not
/// apply to the current status are absent, not null.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_ms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_ms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_ms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_ms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StatusResponse {
    fn from_record(job_id: String, record: &JobRecord) -> Self {
        let details = record.details.as_ref();
        let get = |key: &str| details.and_then(|d| d.get(key).cloned());

        Self {
            job_id,
            status: record.status,
            pdf_path: get(DETAIL_PDF_PATH),
            cached: get(DETAIL_CACHED).map(|v| v == "true"),
            filter_ms: get(DETAIL_FILTER_MS),
            ocr_ms: get(DETAIL_OCR_MS),
            translate_ms: get(DETAIL_TRANSLATE_MS),
            pdf_ms: get(DETAIL_PDF_MS),
            error_message: record.error_message.clone(),
        }
    }
}

/// GET /api/status/{job_id}
pub async fn status<S, Q>(
    State(state): State<AppState<S, Q>>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<StatusResponse>>
where
    S: JobStore + Clone + Send + Sync + 'static,
    Q: JobQueue + Send + Sync + 'static,
{
    let record = state
        .store
        .get_record(&job_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(StatusResponse::from_record(job_id, &record)))
}

/// GET /api/download/{job_id}: stream the artifact of a completed job.
pub async fn download<S, Q>(
    State(state): State<AppState<S, Q>>,
    Path(job_id): Path<String>,
) -> ApiResult<Response>
where
    S: JobStore + Clone + Send + Sync + 'static,
    Q: JobQueue + Send + Sync + 'static,
{
    let record = state
        .store
        .get_record(&job_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if record.status != JobStatus::Completed {
        return Err(ApiError::NotReady {
            status: record.status,
            error_message: record.error_message,
        });
    }

    let artifact_path = record
        .artifact_path
        .ok_or_else(|| ApiError::Internal("completed record has no artifact path".to_string()))?;

    let file = tokio::fs::File::open(&artifact_path)
        .await
        .map_err(|e| ApiError::Internal(format!("artifact unavailable at {artifact_path}: {e}")))?;

    let body = Body::from_stream(ReaderStream::new(file));
    Response::builder()
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{job_id}.pdf\""),
        )
        .body(body)
        .map_err(|e| ApiError::Internal(format!("failed to build response: {e}")))
}
