use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vietpdf::broker::KafkaJobQueue;
use vietpdf::config::Config;
use vietpdf::intake::Intake;
use vietpdf::store::RedisJobStore;

use vietpdf_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vietpdf=info,vietpdf_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(host = %config.http.host, port = config.http.port, "Loaded configuration");

    let store = RedisJobStore::connect(&config.store).await?;
    tracing::info!(addr = %config.store.addr, "Connected to job store");

    let queue = KafkaJobQueue::new(&config.broker)?;
    tracing::info!(broker = %config.broker.broker, topic = %config.broker.topic,
        "Broker producer configured");

    let intake = Intake::new(
        store.clone(),
        queue,
        config.upload_dir.clone(),
        config.store.job_ttl,
    );
    let state = AppState::new(intake, store);
    let app = router(state, &config.http);

    let addr = SocketAddr::new(config.http.host.parse()?, config.http.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Resolves on SIGINT (Ctrl-C) or SIGTERM so the server drains cleanly
/// whether stopped interactively or by a process manager.
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
        () = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
