//! Test harness wiring the intake and the worker state machine over the
//! in-memory store and queue, with a tempdir standing in for the upload and
//! artifact directories.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use tempfile::TempDir;

use vietpdf::broker::MemoryJobQueue;
use vietpdf::intake::{Intake, IntakeOutcome};
use vietpdf::job::JobMessage;
use vietpdf::pipeline::Pipeline;
use vietpdf::store::MemoryJobStore;
use vietpdf::worker::{JobProcessor, ProcessOutcome};
use vietpdf::IntakeError;

use super::engines::{ContentOcr, CopyFilter, PrefixTranslator, StubPdfRenderer};

pub const JOB_TTL: Duration = Duration::from_secs(60);
pub const CACHE_TTL: Duration = Duration::from_secs(120);

type TestProcessor =
    JobProcessor<MemoryJobStore, CopyFilter, ContentOcr, PrefixTranslator, StubPdfRenderer>;

pub struct Harness {
    temp: TempDir,
    pub store: MemoryJobStore,
    pub queue: MemoryJobQueue,
    pub intake: Arc<Intake<MemoryJobStore, MemoryJobQueue>>,
    pub processor: Arc<TestProcessor>,
    drained: Mutex<usize>,
}

impl Harness {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp directory");
        let store = MemoryJobStore::new();
        let queue = MemoryJobQueue::new();

        let intake = Intake::new(
            store.clone(),
            queue.clone(),
            temp.path().join("uploads"),
            JOB_TTL,
        );

        let pipeline = Pipeline::new(
            CopyFilter,
            ContentOcr,
            PrefixTranslator,
            StubPdfRenderer,
            temp.path().join("pdfs"),
        );
        let processor = JobProcessor::new(store.clone(), pipeline, JOB_TTL, CACHE_TTL);

        Self {
            temp,
            store,
            queue,
            intake: Arc::new(intake),
            processor: Arc::new(processor),
            drained: Mutex::new(0),
        }
    }

    pub fn pdf_dir(&self) -> std::path::PathBuf {
        self.temp.path().join("pdfs")
    }

    pub async fn upload(&self, filename: &str, bytes: &[u8]) -> Result<IntakeOutcome, IntakeError> {
        self.intake.accept(filename, bytes).await
    }

    /// Messages published since the last drain, in publish order.
    pub fn pending_messages(&self) -> Vec<JobMessage> {
        let mut drained = self.drained.lock().unwrap();
        let all = self.queue.published();
        let pending = all[*drained..].to_vec();
        *drained = all.len();
        pending
    }

    /// Runs the worker state machine over every pending message, simulating
    /// a consumer draining the topic.
    pub async fn drain(&self) -> Vec<ProcessOutcome> {
        let mut outcomes = Vec::new();
        for message in self.pending_messages() {
            outcomes.push(self.processor.process(&message).await);
        }
        outcomes
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
