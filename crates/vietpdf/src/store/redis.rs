//! Redis-backed job store.
//!
//! Records are stored as one JSON blob under the job identifier, so a
//! terminal write is a single `SET` and readers never see a half-written
//! record. Cache entries live under `imagehash:<fingerprint>`.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::job::JobRecord;

use super::JobStore;

const CACHE_KEY_PREFIX: &str = "imagehash:";

#[derive(Clone)]
pub struct RedisJobStore {
    manager: redis::aio::ConnectionManager,
}

impl RedisJobStore {
    /// Connects to the store and verifies the connection with a `PING`.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = redis::Client::open(format!("redis://{}", config.addr))
            .map_err(StoreError::Connect)?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(StoreError::Connect)?;

        let mut conn = manager.clone();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(StoreError::Connect)?;

        Ok(Self { manager })
    }

    fn cache_key(fingerprint: &str) -> String {
        format!("{CACHE_KEY_PREFIX}{fingerprint}")
    }
}

#[async_trait]
impl JobStore for RedisJobStore {
    async fn put_record(
        &self,
        job_id: &str,
        record: &JobRecord,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let blob = serde_json::to_string(record).map_err(StoreError::Encode)?;
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(job_id, blob, ttl.as_secs()).await?;
        Ok(())
    }

    async fn get_record(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError> {
        let mut conn = self.manager.clone();
        let blob: Option<String> = conn.get(job_id).await?;
        match blob {
            Some(blob) => {
                let record =
                    serde_json::from_str(&blob).map_err(|source| StoreError::Decode {
                        job_id: job_id.to_string(),
                        source,
                    })?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn cache_get(&self, fingerprint: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.manager.clone();
        let path: Option<String> = conn.get(Self::cache_key(fingerprint)).await?;
        Ok(path)
    }

    async fn cache_put(
        &self,
        fingerprint: &str,
        artifact_path: &str,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        conn.set_ex::<_, _, ()>(Self::cache_key(fingerprint), artifact_path, ttl.as_secs())
            .await?;
        Ok(())
    }
}
