//! Broker access: publishing job messages from the ingress and draining
//! them from the workers. Delivery is at-least-once; the consumer commits
//! offsets only after the terminal job-store write.

pub mod kafka;
pub mod memory;

use async_trait::async_trait;

use crate::error::BrokerError;
use crate::job::JobMessage;

#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Publishes a job message, keyed by its job identifier.
    async fn publish(&self, message: &JobMessage) -> Result<(), BrokerError>;
}

pub use kafka::{KafkaJobConsumer, KafkaJobQueue};
pub use memory::MemoryJobQueue;
