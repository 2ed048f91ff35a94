//! The job data model shared between the ingress and the workers.
//!
//! A `JobRecord` is the canonical per-job state, stored in the job store as
//! a single JSON blob so terminal writes are atomic with respect to readers:
//! nobody can observe `completed` without the artifact path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Keys of the terminal details map.
pub const DETAIL_CACHED: &str = "cached";
pub const DETAIL_FILTER_MS: &str = "filter_ms";
pub const DETAIL_OCR_MS: &str = "ocr_ms";
pub const DETAIL_TRANSLATE_MS: &str = "translate_ms";
pub const DETAIL_PDF_MS: &str = "pdf_ms";
pub const DETAIL_PDF_PATH: &str = "pdf_path";

/// Lifecycle state of a job. `Completed` and `Failed` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Canonical per-job state. Constructed only through the typed mutations
/// below, which keep the field/status invariants honest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, String>>,
}

impl JobRecord {
    /// Accepted and published; no worker has claimed it yet.
    pub fn queued() -> Self {
        Self {
            status: JobStatus::Queued,
            artifact_path: None,
            error_message: None,
            details: None,
        }
    }

    /// A worker has started executing the pipeline.
    pub fn processing() -> Self {
        Self {
            status: JobStatus::Processing,
            artifact_path: None,
            error_message: None,
            details: None,
        }
    }

    /// Terminal success; the artifact is available at `artifact_path`.
    pub fn completed(artifact_path: impl Into<String>, details: BTreeMap<String, String>) -> Self {
        Self {
            status: JobStatus::Completed,
            artifact_path: Some(artifact_path.into()),
            error_message: None,
            details: Some(details),
        }
    }

    /// Terminal failure with a stage-qualified message.
    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            artifact_path: None,
            error_message: Some(error_message.into()),
            details: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Builds the details map for a completion served from the artifact cache.
pub fn cached_details(artifact_path: &str) -> BTreeMap<String, String> {
    let mut details = BTreeMap::new();
    details.insert(DETAIL_CACHED.to_string(), "true".to_string());
    details.insert(DETAIL_PDF_PATH.to_string(), artifact_path.to_string());
    details
}

/// The message published to the broker for each cache-missing upload.
/// Keyed by `job_id` on the topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMessage {
    pub job_id: String,
    pub image_path: String,
}
