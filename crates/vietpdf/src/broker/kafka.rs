//! Kafka producer and consumer, thin wrappers over `rdkafka`.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Message};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;

use crate::config::BrokerConfig;
use crate::error::BrokerError;
use crate::job::JobMessage;

use super::JobQueue;

const PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Producer used by the ingress. Cheap to clone.
#[derive(Clone)]
pub struct KafkaJobQueue {
    producer: FutureProducer,
    topic: String,
}

impl KafkaJobQueue {
    pub fn new(config: &BrokerConfig) -> Result<Self, BrokerError> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", &config.broker)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(BrokerError::Client)?;

        Ok(Self {
            producer,
            topic: config.topic.clone(),
        })
    }
}

#[async_trait]
impl JobQueue for KafkaJobQueue {
    async fn publish(&self, message: &JobMessage) -> Result<(), BrokerError> {
        let payload = serde_json::to_vec(message).map_err(BrokerError::EncodeMessage)?;
        let record = FutureRecord::to(&self.topic)
            .key(&message.job_id)
            .payload(&payload);

        self.producer
            .send(record, Timeout::After(PUBLISH_TIMEOUT))
            .await
            .map_err(|(err, _)| BrokerError::Publish(err))?;

        tracing::debug!(job_id = %message.job_id, topic = %self.topic, "Published job message");
        Ok(())
    }
}

/// A message pulled from the topic, holding the broker handle needed to
/// commit its offset.
pub struct Delivery<'a> {
    raw: BorrowedMessage<'a>,
}

impl Delivery<'_> {
    pub fn decode(&self) -> Result<JobMessage, BrokerError> {
        let payload = self.raw.payload().ok_or(BrokerError::EmptyMessage)?;
        serde_json::from_slice(payload).map_err(BrokerError::MalformedMessage)
    }

    pub fn partition(&self) -> i32 {
        self.raw.partition()
    }

    pub fn offset(&self) -> i64 {
        self.raw.offset()
    }
}

/// Consumer used by the workers. One instance per consumer task; all share
/// the configured consumer group.
pub struct KafkaJobConsumer {
    consumer: StreamConsumer,
}

impl KafkaJobConsumer {
    pub fn new(config: &BrokerConfig) -> Result<Self, BrokerError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.broker)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(BrokerError::Client)?;

        consumer
            .subscribe(&[&config.topic])
            .map_err(BrokerError::Client)?;

        Ok(Self { consumer })
    }

    /// Blocks until the next message arrives. Cancel by dropping the future
    /// (select against a shutdown signal).
    pub async fn recv(&self) -> Result<Delivery<'_>, BrokerError> {
        let raw = self.consumer.recv().await.map_err(BrokerError::Fetch)?;
        Ok(Delivery { raw })
    }

    /// Commits the delivery's offset. Called only after the terminal
    /// job-store write.
    pub fn commit(&self, delivery: &Delivery<'_>) -> Result<(), BrokerError> {
        self.consumer
            .commit_message(&delivery.raw, CommitMode::Sync)
            .map_err(BrokerError::Commit)
    }
}
