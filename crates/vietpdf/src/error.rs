use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store connection failed: {0}")]
    Connect(#[source] redis::RedisError),

    #[error("Store command failed: {0}")]
    Command(#[from] redis::RedisError),

    #[error("Failed to encode job record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode job record for '{job_id}': {source}")]
    Decode {
        job_id: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Broker client configuration failed: {0}")]
    Client(#[source] rdkafka::error::KafkaError),

    #[error("Failed to publish job message: {0}")]
    Publish(#[source] rdkafka::error::KafkaError),

    #[error("Failed to fetch from broker: {0}")]
    Fetch(#[source] rdkafka::error::KafkaError),

    #[error("Failed to commit offset: {0}")]
    Commit(#[source] rdkafka::error::KafkaError),

    #[error("Failed to encode job message: {0}")]
    EncodeMessage(#[source] serde_json::Error),

    #[error("Malformed job message: {0}")]
    MalformedMessage(#[source] serde_json::Error),

    #[error("Job message has no payload")]
    EmptyMessage,
}

/// A pipeline stage failure. The Display form is stage-qualified so it can
/// be written verbatim into a failed job record.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Image filtering error: {0}")]
    Filter(String),

    #[error("OCR error: {0}")]
    Ocr(String),

    #[error("Translation error: {0}")]
    Translate(String),

    #[error("PDF generation error: {0}")]
    Pdf(String),
}

impl StageError {
    /// The stage this error is attributed to, for logging.
    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Filter(_) => "filter",
            StageError::Ocr(_) => "ocr",
            StageError::Translate(_) => "translate",
            StageError::Pdf(_) => "pdf",
        }
    }
}

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("Failed to stage upload '{path}': {source}")]
    StageUpload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Job store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to queue job for processing: {0}")]
    Broker(#[from] BrokerError),
}
