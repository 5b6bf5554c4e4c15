//! TCP listener and signal-driven shutdown for genscan-api

use anyhow::{Context, Result};
use axum::Router;
use genscan_core::Config;

/// Bind `0.0.0.0:<port>` and serve `app` until a shutdown signal arrives.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        max_file_mb = config.input.max_file_size_bytes / 1024 / 1024,
        extensions = %config.input.allowed_extensions.join(","),
        default_threshold = config.input.default_threshold,
        inline_limit_bytes = config.detector.inline_limit_bytes,
        "genscan-api listening on {}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Resolves on the first of SIGINT or SIGTERM so in-flight detections can drain.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        "SIGINT"
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let signal = tokio::select! {
        name = interrupt => name,
        name = terminate => name,
    };

    tracing::info!(signal, "Stopping genscan-api, draining open requests");
}
