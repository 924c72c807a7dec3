//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vidpress_core::Config;
use vidpress_processing::FFmpegService;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!("Configuration loaded and validated successfully");

    tokio::fs::create_dir_all(config.scratch_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create scratch directory {}",
                config.scratch_dir().display()
            )
        })?;

    let toolkit = FFmpegService::from_config(&config).context("Failed to set up ffmpeg")?;
    let state = Arc::new(AppState::new(config.clone(), Arc::new(toolkit)));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
