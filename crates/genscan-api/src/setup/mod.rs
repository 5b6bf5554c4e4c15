//! Application setup and initialization

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use genscan_core::Config;
use genscan_detector::Detector;

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    crate::error::set_hide_error_details(config.is_production());

    tracing::info!(
        detector = ?config.detector,
        environment = %config.server.environment,
        "Configuration loaded and validated successfully"
    );

    let detector =
        Detector::from_config(config.detector.clone()).context("Failed to create detector")?;
    let state = Arc::new(AppState::new(config, detector));

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
