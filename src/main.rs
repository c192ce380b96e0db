use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use review_classifier::config::Cli;
use review_classifier::device::select_device;
use review_classifier::{api, BertClassifier, InferenceService, ServerConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_cli(Cli::parse())?;
    info!(
        model_dir = %config.model_dir.display(),
        listen_addr = %config.listen_addr,
        max_length = config.max_length,
        "Starting review classifier"
    );

    // Nothing is bound until the model is loaded.
    let device = select_device(config.device)?;
    let classifier = BertClassifier::load(&config.model_dir, device, config.max_length)
        .context("Error loading model or tokenizer")?;
    let service = Arc::new(InferenceService::new(
        Arc::new(classifier),
        config.labels.clone(),
    ));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %config.listen_addr, "Model is ready to make predictions");

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
