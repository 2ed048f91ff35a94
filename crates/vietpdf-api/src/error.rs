use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use vietpdf::error::{IntakeError, StoreError};
use vietpdf::job::JobStatus;

/// Handler-level error type. Implements [`IntoResponse`] so every failure
/// surfaces as a consistent JSON body. The worker side never goes through
/// here; it reifies errors into failed job records instead.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Job not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Download requested before the job reached `completed`.
    #[error("Job not completed")]
    NotReady {
        status: JobStatus,
        error_message: Option<String>,
    },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                axum::Json(json!({ "error": "Job not found" })),
            )
                .into_response(),

            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({ "error": message })),
            )
                .into_response(),

            ApiError::NotReady {
                status,
                error_message,
            } => {
                let mut body = json!({
                    "error": "Job not completed",
                    "status": status,
                });
                if let Some(message) = error_message {
                    body["error_message"] = json!(message);
                }
                (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
            }

            ApiError::Store(err) => {
                tracing::error!(error = %err, "Store error while serving request");
                internal("Failed to get job status")
            }

            ApiError::Intake(err) => {
                tracing::error!(error = %err, "Upload intake failed");
                let message = match err {
                    IntakeError::StageUpload { .. } => "Failed to save uploaded file",
                    IntakeError::Store(_) => "Failed to initiate job processing (store error)",
                    IntakeError::Broker(_) => "Failed to queue job for processing (broker error)",
                };
                internal(message)
            }

            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal error");
                internal("An internal error occurred")
            }
        }
    }
}

fn internal(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({ "error": message })),
    )
        .into_response()
}
