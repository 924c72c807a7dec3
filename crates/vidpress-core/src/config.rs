//! Configuration module
//!
//! This module provides configuration structures for the HTTP server and the
//! compression pipeline. Values are read from the environment (optionally
//! seeded from a `.env` file).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

// Common constants
const SERVER_PORT: u16 = 3000;
const SCRATCH_DIR: &str = "uploads";
const MAX_VIDEO_SIZE_MB: usize = 500;
const MAX_CONCURRENT_TRANSCODES: usize = 2;
const TRANSCODE_QUEUE_TIMEOUT_SECS: u64 = 30;
const PROBE_TIMEOUT_SECS: u64 = 30;
const FFMPEG_TIMEOUT_SECS: u64 = 600;
const DEFAULT_QUALITY: u8 = 50;

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
}

/// Compression service configuration
#[derive(Clone, Debug)]
pub struct MediaServiceConfig {
    pub base: BaseConfig,
    /// Root under which every request gets its own scratch directory.
    pub scratch_dir: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub max_video_size_bytes: usize,
    pub max_concurrent_transcodes: usize,
    /// How long a request may wait for a transcode slot. 0 = reject immediately.
    pub transcode_queue_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub ffmpeg_timeout_secs: u64,
    pub default_quality: u8,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<MediaServiceConfig>);

impl Config {
    fn as_media(&self) -> &MediaServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_media().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = MediaServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_media().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_media().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_media().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_media().base.environment
    }

    pub fn scratch_dir(&self) -> &PathBuf {
        &self.as_media().scratch_dir
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_media().ffmpeg_path
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.as_media().ffprobe_path
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.as_media().max_video_size_bytes
    }

    pub fn max_concurrent_transcodes(&self) -> usize {
        self.as_media().max_concurrent_transcodes
    }

    pub fn transcode_queue_timeout(&self) -> Duration {
        Duration::from_secs(self.as_media().transcode_queue_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.as_media().probe_timeout_secs)
    }

    pub fn ffmpeg_timeout(&self) -> Duration {
        Duration::from_secs(self.as_media().ffmpeg_timeout_secs)
    }

    pub fn default_quality(&self) -> u8 {
        self.as_media().default_quality
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

impl MediaServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (the process
    /// environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
        };

        let max_video_size_mb = lookup("MAX_VIDEO_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let default_quality = match lookup("DEFAULT_QUALITY") {
            Some(raw) => raw
                .trim()
                .parse::<u8>()
                .map_err(|_| anyhow::anyhow!("DEFAULT_QUALITY must be an integer between 1 and 100"))?,
            None => DEFAULT_QUALITY,
        };

        let config = MediaServiceConfig {
            base,
            scratch_dir: PathBuf::from(
                lookup("SCRATCH_DIR").unwrap_or_else(|| SCRATCH_DIR.to_string()),
            ),
            ffmpeg_path: lookup("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: lookup("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            max_concurrent_transcodes: lookup("MAX_CONCURRENT_TRANSCODES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONCURRENT_TRANSCODES),
            transcode_queue_timeout_secs: lookup("TRANSCODE_QUEUE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(TRANSCODE_QUEUE_TIMEOUT_SECS),
            probe_timeout_secs: lookup("PROBE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(PROBE_TIMEOUT_SECS),
            ffmpeg_timeout_secs: lookup("FFMPEG_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(FFMPEG_TIMEOUT_SECS),
            default_quality,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!("Max video size cannot be 0"));
        }
        if self.max_concurrent_transcodes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_TRANSCODES must be at least 1"
            ));
        }
        if self.probe_timeout_secs == 0 || self.ffmpeg_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "PROBE_TIMEOUT_SECS and FFMPEG_TIMEOUT_SECS must be greater than 0"
            ));
        }
        if !(1..=100).contains(&self.default_quality) {
            return Err(anyhow::anyhow!(
                "DEFAULT_QUALITY must be between 1 and 100, got {}",
                self.default_quality
            ));
        }
        if self.ffmpeg_path.trim().is_empty() || self.ffprobe_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FFMPEG_PATH and FFPROBE_PATH cannot be empty"));
        }
        Ok(())
    }
}
