//! Upload intake: turns an accepted image into a tracked job.
//!
//! The cache short-circuit happens here, synchronously, so a byte-identical
//! resubmission never spawns redundant pipeline work. Each upload still
//! gets a fresh job identifier, so polling clients never special-case
//! caching.

use std::path::PathBuf;
use std::time::Duration;

use crate::broker::JobQueue;
use crate::error::IntakeError;
use crate::fingerprint::fingerprint_bytes;
use crate::job::{cached_details, JobMessage, JobRecord};
use crate::sanitize::sanitize_filename;
use crate::store::JobStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeOutcome {
    pub job_id: String,
    /// Whether the job was completed immediately from the artifact cache.
    pub cached: bool,
}

pub struct Intake<S, Q> {
    store: S,
    queue: Q,
    upload_dir: PathBuf,
    job_ttl: Duration,
}

impl<S, Q> Intake<S, Q>
where
    S: JobStore,
    Q: JobQueue,
{
    pub fn new(store: S, queue: Q, upload_dir: impl Into<PathBuf>, job_ttl: Duration) -> Self {
        Self {
            store,
            queue,
            upload_dir: upload_dir.into(),
            job_ttl,
        }
    }

    /// Accepts an upload: stages the bytes, fingerprints them, and either
    /// completes from cache or queues a job for the workers.
    pub async fn accept(&self, filename: &str, bytes: &[u8]) -> Result<IntakeOutcome, IntakeError> {
        let job_id = uuid::Uuid::new_v4().to_string();
        let staged_name = format!("{job_id}-{}", sanitize_filename(filename));
        let staged_path = self.upload_dir.join(staged_name);

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|source| IntakeError::StageUpload {
                path: self.upload_dir.clone(),
                source,
            })?;
        tokio::fs::write(&staged_path, bytes)
            .await
            .map_err(|source| IntakeError::StageUpload {
                path: staged_path.clone(),
                source,
            })?;

        let fingerprint = fingerprint_bytes(bytes);

        if let Some(artifact) = self.store.cache_get(&fingerprint).await? {
            tracing::info!(job_id = %job_id, fingerprint = %fingerprint, artifact = %artifact,
                "Upload matched cached artifact");
            let record = JobRecord::completed(&artifact, cached_details(&artifact));
            self.store
                .put_record(&job_id, &record, self.job_ttl)
                .await?;
            return Ok(IntakeOutcome {
                job_id,
                cached: true,
            });
        }

        // The queued record is written before the publish; if the publish
        // fails the record simply ages out via TTL.
        self.store
            .put_record(&job_id, &JobRecord::queued(), self.job_ttl)
            .await?;

        let message = JobMessage {
            job_id: job_id.clone(),
            image_path: staged_path.display().to_string(),
        };
        self.queue.publish(&message).await?;

        tracing::info!(job_id = %job_id, image = %message.image_path, "Job queued");
        Ok(IntakeOutcome {
            job_id,
            cached: false,
        })
    }
}
