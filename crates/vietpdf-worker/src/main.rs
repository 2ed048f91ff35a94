use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vietpdf::broker::KafkaJobConsumer;
use vietpdf::config::Config;
use vietpdf::engine::{GoogleTranslator, GrayscaleFilter, TesseractOcr, TextPdfRenderer};
use vietpdf::pipeline::Pipeline;
use vietpdf::store::RedisJobStore;
use vietpdf::worker::{run_consumer, JobProcessor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vietpdf=info,vietpdf_worker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        broker = %config.broker.broker,
        topic = %config.broker.topic,
        group = %config.broker.group_id,
        workers = config.worker_count,
        "Worker starting"
    );

    let store = RedisJobStore::connect(&config.store).await?;
    tracing::info!(addr = %config.store.addr, "Connected to job store");

    let pipeline = Pipeline::new(
        GrayscaleFilter::new(),
        TesseractOcr::new(&config.ocr),
        GoogleTranslator::new(&config.translate),
        TextPdfRenderer::new(&config.pdf),
        config.pdf_dir.clone(),
    );
    let processor = Arc::new(JobProcessor::new(
        store,
        pipeline,
        config.store.job_ttl,
        config.store.cache_ttl,
    ));

    let shutdown = CancellationToken::new();

    let mut consumers = Vec::with_capacity(config.worker_count);
    for id in 0..config.worker_count {
        let consumer = KafkaJobConsumer::new(&config.broker)?;
        let processor = Arc::clone(&processor);
        let shutdown = shutdown.clone();
        consumers.push(tokio::spawn(async move {
            tracing::info!(consumer = id, "Consumer task started");
            run_consumer(consumer, processor, shutdown).await;
            tracing::info!(consumer = id, "Consumer task stopped");
        }));
    }

    shutdown_signal().await;
    tracing::info!("Termination signal received, draining in-flight work");
    shutdown.cancel();

    for consumer in consumers {
        if let Err(e) = consumer.await {
            tracing::error!(error = %e, "Consumer task panicked");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
