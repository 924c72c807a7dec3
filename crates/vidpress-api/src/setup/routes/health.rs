//! Health check handler and response type.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Run an async check with timeout; `Err` carries "timeout" or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> Result<(), String>
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(format!("{}: {}", error_prefix, e)),
        Err(_) => Err("timeout".to_string()),
    }
}

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub ffmpeg: bool,
    pub ffprobe: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffprobe_error: Option<String>,
    pub transcode_slots: usize,
    pub available_transcode_slots: usize,
}

/// Toolchain availability plus free transcode slots.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    const TIMEOUT: Duration = Duration::from_secs(5);

    let toolkit = state.toolkit();
    let ffmpeg = run_check(TIMEOUT, toolkit.check_ffmpeg(), "ffmpeg unavailable").await;
    let ffprobe = run_check(TIMEOUT, toolkit.check_ffprobe(), "ffprobe unavailable").await;

    let overall_healthy = ffmpeg.is_ok() && ffprobe.is_ok();
    if !overall_healthy {
        tracing::warn!(ffmpeg = ?ffmpeg, ffprobe = ?ffprobe, "Health check failed");
    }

    let response = HealthCheckResponse {
        status: if overall_healthy { "healthy" } else { "unhealthy" }.to_string(),
        ffmpeg: ffmpeg.is_ok(),
        ffprobe: ffprobe.is_ok(),
        ffmpeg_error: ffmpeg.err(),
        ffprobe_error: ffprobe.err(),
        transcode_slots: state.limiter.slots(),
        available_transcode_slots: state.limiter.available(),
    };

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
