//! The broker drain loop: pull, process, commit, repeat.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::broker::KafkaJobConsumer;
use crate::engine::{ImageFilter, OcrEngine, PdfRenderer, Translator};
use crate::store::JobStore;

use super::{JobProcessor, ProcessOutcome};

/// Drains the topic until `shutdown` fires. The in-flight message always
/// finishes and commits before the loop exits; offsets are committed only
/// after the terminal job-store write inside `process`.
pub async fn run_consumer<S, F, O, T, P>(
    consumer: KafkaJobConsumer,
    processor: Arc<JobProcessor<S, F, O, T, P>>,
    shutdown: CancellationToken,
) where
    S: JobStore,
    F: ImageFilter + 'static,
    O: OcrEngine + 'static,
    T: Translator + 'static,
    P: PdfRenderer + 'static,
{
    loop {
        let delivery = tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Shutdown requested, consumer exiting");
                break;
            }
            delivery = consumer.recv() => delivery,
        };

        let delivery = match delivery {
            Ok(delivery) => delivery,
            Err(e) => {
                error!(error = %e, "Failed to fetch from broker");
                continue;
            }
        };

        let message = match delivery.decode() {
            Ok(message) => message,
            Err(e) => {
                // Commit so a poison message is not redelivered forever.
                warn!(partition = delivery.partition(), offset = delivery.offset(),
                    error = %e, "Skipping malformed message");
                if let Err(e) = consumer.commit(&delivery) {
                    error!(error = %e, "Failed to commit malformed message");
                }
                continue;
            }
        };

        info!(job_id = %message.job_id, partition = delivery.partition(),
            offset = delivery.offset(), "Received job");

        let outcome = processor.process(&message).await;
        match outcome {
            ProcessOutcome::Completed { cached } => {
                info!(job_id = %message.job_id, cached, "Job handled");
            }
            ProcessOutcome::Failed => {
                warn!(job_id = %message.job_id, "Job handled with failure");
            }
        }

        if let Err(e) = consumer.commit(&delivery) {
            error!(job_id = %message.job_id, offset = delivery.offset(), error = %e,
                "Failed to commit offset");
        }
    }
}
