//! The job store is the only shared state surface between the ingress and
//! the workers. Holds per-job records and the content-addressed artifact
//! cache.

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::job::JobRecord;

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Atomically replaces the full record for a job.
    async fn put_record(
        &self,
        job_id: &str,
        record: &JobRecord,
        ttl: Duration,
    ) -> Result<(), StoreError>;

    /// Returns the record for a job, or `None` if unknown or expired.
    async fn get_record(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError>;

    /// Looks up the artifact cache by image fingerprint.
    async fn cache_get(&self, fingerprint: &str) -> Result<Option<String>, StoreError>;

    /// Maps an image fingerprint to an artifact path. Concurrent writers may
    /// race; last write wins, and all writes point at equivalent artifacts.
    async fn cache_put(
        &self,
        fingerprint: &str,
        artifact_path: &str,
        ttl: Duration,
    ) -> Result<(), StoreError>;
}

pub use self::memory::MemoryJobStore;
pub use self::redis::RedisJobStore;
