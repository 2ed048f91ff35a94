//! In-memory job store for tests and local experimentation.
//!
//! Besides the `JobStore` contract it records every status written per job,
//! so tests can assert that observers only ever see monotone progression
//! through the lifecycle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::StoreError;
use crate::job::{JobRecord, JobStatus};

use super::JobStore;

#[derive(Default)]
struct Inner {
    records: HashMap<String, (JobRecord, Option<Instant>)>,
    cache: HashMap<String, (String, Option<Instant>)>,
    transitions: Vec<(String, JobStatus)>,
}

#[derive(Clone, Default)]
pub struct MemoryJobStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every status written for `job_id`, in write order.
    pub fn status_log(&self, job_id: &str) -> Vec<JobStatus> {
        let inner = self.inner.lock().unwrap();
        inner
            .transitions
            .iter()
            .filter(|(id, _)| id == job_id)
            .map(|(_, status)| *status)
            .collect()
    }

    /// Every `(job_id, status)` write across all jobs, in write order.
    pub fn all_transitions(&self) -> Vec<(String, JobStatus)> {
        self.inner.lock().unwrap().transitions.clone()
    }

    /// Drops a cache entry, simulating TTL expiry.
    pub fn evict_cache(&self, fingerprint: &str) {
        self.inner.lock().unwrap().cache.remove(fingerprint);
    }

    fn expired(deadline: &Option<Instant>) -> bool {
        deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn put_record(
        &self,
        job_id: &str,
        record: &JobRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .transitions
            .push((job_id.to_string(), record.status));
        inner.records.insert(
            job_id.to_string(),
            (record.clone(), Instant::now().checked_add(ttl)),
        );
        Ok(())
    }

    async fn get_record(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.records.get(job_id) {
            Some((_, deadline)) if Self::expired(deadline) => {
                inner.records.remove(job_id);
                Ok(None)
            }
            Some((record, _)) => Ok(Some(record.clone())),
            None => Ok(None),
        }
    }

    async fn cache_get(&self, fingerprint: &str) -> Result<Option<String>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.cache.get(fingerprint) {
            Some((_, deadline)) if Self::expired(deadline) => {
                inner.cache.remove(fingerprint);
                Ok(None)
            }
            Some((path, _)) => Ok(Some(path.clone())),
            None => Ok(None),
        }
    }

    async fn cache_put(
        &self,
        fingerprint: &str,
        artifact_path: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.cache.insert(
            fingerprint.to_string(),
            (artifact_path.to_string(), Instant::now().checked_add(ttl)),
        );
        Ok(())
    }
}
