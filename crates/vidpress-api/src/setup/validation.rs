//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use vidpress_core::Config;

/// Validate critical configuration values
///
/// Runs the structural checks from `Config::validate`, then warns about
/// settings that are legal but likely to hurt a running server.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.ffmpeg_timeout() < config.probe_timeout() {
        tracing::warn!(
            ffmpeg_timeout_secs = config.ffmpeg_timeout().as_secs(),
            probe_timeout_secs = config.probe_timeout().as_secs(),
            "FFMPEG_TIMEOUT_SECS is shorter than PROBE_TIMEOUT_SECS - long videos will time out"
        );
    }

    if config.max_concurrent_transcodes() > 16 {
        tracing::warn!(
            max_concurrent_transcodes = config.max_concurrent_transcodes(),
            "MAX_CONCURRENT_TRANSCODES is very high - each transcode runs its own ffmpeg process"
        );
    }

    Ok(())
}
