pub mod broker;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod intake;
pub mod job;
pub mod pipeline;
pub mod sanitize;
pub mod store;
pub mod worker;

pub use broker::{JobQueue, KafkaJobConsumer, KafkaJobQueue, MemoryJobQueue};
pub use config::Config;
pub use error::{BrokerError, ConfigError, IntakeError, StageError, StoreError};
pub use intake::{Intake, IntakeOutcome};
pub use job::{JobMessage, JobRecord, JobStatus};
pub use pipeline::Pipeline;
pub use store::{JobStore, MemoryJobStore, RedisJobStore};
pub use worker::{JobProcessor, ProcessOutcome};
