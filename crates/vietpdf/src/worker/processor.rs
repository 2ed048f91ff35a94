//! Per-message job execution.
//!
//! The broker delivers at least once, so everything here tolerates
//! re-delivery: the fingerprint is recomputed from the file on disk (the
//! ingress is not trusted), the cache probe absorbs replays of completed
//! work, and terminal writes land on the same state.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::engine::{ImageFilter, OcrEngine, PdfRenderer, Translator};
use crate::fingerprint::fingerprint_file;
use crate::job::{cached_details, JobMessage, JobRecord};
use crate::pipeline::Pipeline;
use crate::store::JobStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    Completed { cached: bool },
    Failed,
}

pub struct JobProcessor<S, F, O, T, P> {
    store: S,
    pipeline: Arc<Pipeline<F, O, T, P>>,
    job_ttl: Duration,
    cache_ttl: Duration,
}

impl<S, F, O, T, P> JobProcessor<S, F, O, T, P>
where
    S: JobStore,
    F: ImageFilter + 'static,
    O: OcrEngine + 'static,
    T: Translator + 'static,
    P: PdfRenderer + 'static,
{
    pub fn new(
        store: S,
        pipeline: Pipeline<F, O, T, P>,
        job_ttl: Duration,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            store,
            pipeline: Arc::new(pipeline),
            job_ttl,
            cache_ttl,
        }
    }

    /// Executes the state machine for one delivered message. Every path
    /// ends in a terminal record write; the caller commits the offset after
    /// this returns.
    pub async fn process(&self, message: &JobMessage) -> ProcessOutcome {
        let job_id = message.job_id.clone();
        let image_path = Path::new(&message.image_path).to_path_buf();

        if let Err(e) = tokio::fs::create_dir_all(self.pipeline.pdf_dir()).await {
            return self
                .fail(
                    &job_id,
                    format!(
                        "Cannot create PDF output directory {}: {e}",
                        self.pipeline.pdf_dir().display()
                    ),
                )
                .await;
        }

        // The ingress computed a fingerprint too, but replayed or crafted
        // messages must not poison the cache, so recompute from disk.
        let fp_path = image_path.clone();
        let fingerprint =
            match tokio::task::spawn_blocking(move || fingerprint_file(&fp_path)).await {
                Ok(Ok(fingerprint)) => fingerprint,
                Ok(Err(e)) => {
                    return self
                        .fail(&job_id, format!("Failed to fingerprint image: {e}"))
                        .await;
                }
                Err(e) => {
                    return self
                        .fail(&job_id, format!("Fingerprint task failed: {e}"))
                        .await;
                }
            };

        match self.store.cache_get(&fingerprint).await {
            Ok(Some(cached_path)) => {
                tracing::info!(job_id = %job_id, fingerprint = %fingerprint, artifact = %cached_path,
                    "Cache hit, reusing artifact");
                self.write_record(
                    &job_id,
                    &JobRecord::completed(&cached_path, cached_details(&cached_path)),
                )
                .await;
                return ProcessOutcome::Completed { cached: true };
            }
            Ok(None) => {}
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Cache probe failed, proceeding without cache");
            }
        }

        // Best-effort: a reader that misses this transition still observes
        // a valid lifecycle, so processing continues on store failure.
        self.write_record(&job_id, &JobRecord::processing()).await;

        let pipeline = Arc::clone(&self.pipeline);
        let run_job_id = job_id.clone();
        let run_result =
            tokio::task::spawn_blocking(move || pipeline.run(&run_job_id, &image_path)).await;

        let output = match run_result {
            Ok(Ok(output)) => output,
            Ok(Err(stage_err)) => {
                tracing::warn!(job_id = %job_id, stage = stage_err.stage(), error = %stage_err,
                    "Pipeline stage failed");
                return self.fail(&job_id, stage_err.to_string()).await;
            }
            Err(e) => {
                return self.fail(&job_id, format!("Pipeline task failed: {e}")).await;
            }
        };

        let artifact = output.artifact_path.display().to_string();
        let details = output.timings.fresh_details(&artifact);
        self.write_record(&job_id, &JobRecord::completed(&artifact, details))
            .await;

        if let Err(e) = self
            .store
            .cache_put(&fingerprint, &artifact, self.cache_ttl)
            .await
        {
            warn!(job_id = %job_id, fingerprint = %fingerprint, error = %e, "Failed to insert artifact cache entry");
        }

        tracing::info!(job_id = %job_id, artifact = %artifact, "Job completed");
        ProcessOutcome::Completed { cached: false }
    }

    async fn fail(&self, job_id: &str, message: String) -> ProcessOutcome {
        tracing::warn!(job_id = %job_id, error = %message, "Job failed");
        self.write_record(job_id, &JobRecord::failed(message)).await;
        ProcessOutcome::Failed
    }

    /// Record writes never abort the state machine: the artifact (if any)
    /// exists either way, and a stale record ages out via TTL.
    async fn write_record(&self, job_id: &str, record: &JobRecord) {
        if let Err(e) = self.store.put_record(job_id, record, self.job_ttl).await {
            tracing::error!(job_id = %job_id, status = %record.status, error = %e,
                "Failed to write job record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StageError;
    use crate::job::JobStatus;
    use crate::store::MemoryJobStore;
    use std::path::PathBuf;

    struct PassthroughFilter;
    impl ImageFilter for PassthroughFilter {
        fn apply(&self, input: &Path) -> Result<PathBuf, StageError> {
            Ok(input.to_path_buf())
        }
    }

    struct FixedOcr;
    impl OcrEngine for FixedOcr {
        fn recognize(&self, _image: &Path) -> Result<String, StageError> {
            Ok("hello".to_string())
        }
    }

    struct EchoTranslator;
    impl Translator for EchoTranslator {
        fn translate(&self, text: &str) -> Result<String, StageError> {
            Ok(text.to_string())
        }
    }

    struct StubRenderer;
    impl PdfRenderer for StubRenderer {
        fn render(&self, text: &str, output: &Path) -> Result<(), StageError> {
            std::fs::write(output, format!("%PDF-1.5\n{text}"))
                .map_err(|e| StageError::Pdf(e.to_string()))
        }
    }

    const TTL: Duration = Duration::from_secs(60);

    fn processor_in(
        store: MemoryJobStore,
        pdf_dir: &Path,
    ) -> JobProcessor<MemoryJobStore, PassthroughFilter, FixedOcr, EchoTranslator, StubRenderer>
    {
        let pipeline = Pipeline::new(
            PassthroughFilter,
            FixedOcr,
            EchoTranslator,
            StubRenderer,
            pdf_dir,
        );
        JobProcessor::new(store, pipeline, TTL, TTL)
    }

    #[tokio::test]
    async fn missing_image_fails_with_fingerprint_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryJobStore::new();
        let processor = processor_in(store.clone(), dir.path());

        let outcome = processor
            .process(&JobMessage {
                job_id: "job-1".to_string(),
                image_path: dir.path().join("missing.png").display().to_string(),
            })
            .await;

        assert_eq!(outcome, ProcessOutcome::Failed);
        let record = store.get_record("job-1").await.unwrap().unwrap();
        assert_eq!(record.status, JobStatus::Failed);
        assert!(record
            .error_message
            .unwrap()
            .contains("Failed to fingerprint image"));
    }

    #[tokio::test]
    async fn cache_hit_short_circuits_the_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("input.png");
        std::fs::write(&image, b"raw bytes").unwrap();

        let store = MemoryJobStore::new();
        let fingerprint = crate::fingerprint::fingerprint_file(&image).unwrap();
        store
            .cache_put(&fingerprint, "/pdfs/earlier.pdf", TTL)
            .await
            .unwrap();

        let processor = processor_in(store.clone(), dir.path());
        let outcome = processor
            .process(&JobMessage {
                job_id: "job-2".to_string(),
                image_path: image.display().to_string(),
            })
            .await;

        assert_eq!(outcome, ProcessOutcome::Completed { cached: true });
        let record = store.get_record("job-2").await.unwrap().unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.artifact_path.as_deref(), Some("/pdfs/earlier.pdf"));
        let details = record.details.unwrap();
        assert_eq!(details.get("cached").unwrap(), "true");
        // The pipeline never ran, so no processing transition was observed.
        assert_eq!(
            store.status_log("job-2"),
            vec![JobStatus::Completed]
        );
    }
}
