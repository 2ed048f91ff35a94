//! The worker side: one `JobProcessor` execution per delivered broker
//! message, updating the job store and populating the artifact cache.

pub mod consumer;
pub mod processor;

pub use consumer::run_consumer;
pub use processor::{JobProcessor, ProcessOutcome};
