//! In-memory job queue for tests. Captures published messages and can be
//! switched into a failing mode to exercise broker-outage paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};

use crate::error::BrokerError;
use crate::job::JobMessage;

use super::JobQueue;

#[derive(Clone, Default)]
pub struct MemoryJobQueue {
    published: Arc<Mutex<Vec<JobMessage>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages published so far, in order.
    pub fn published(&self) -> Vec<JobMessage> {
        self.published.lock().unwrap().clone()
    }

    /// When set, every publish fails as if the broker were down.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn publish(&self, message: &JobMessage) -> Result<(), BrokerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BrokerError::Publish(KafkaError::MessageProduction(
                RDKafkaErrorCode::BrokerTransportFailure,
            )));
        }
        self.published.lock().unwrap().push(message.clone());
        Ok(())
    }
}
