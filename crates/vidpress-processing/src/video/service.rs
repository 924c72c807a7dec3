//! FFmpegService - the ffprobe/ffmpeg backed [`VideoToolkit`].

use crate::process::ToolError;
use crate::video::processor::VideoProcessor;
use crate::video::toolkit::VideoToolkit;
use crate::video::transformer::VideoTransformer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use vidpress_core::{Config, VideoMetadata};

#[derive(Debug, Clone)]
pub struct FFmpegService {
    processor: VideoProcessor,
    transformer: VideoTransformer,
}

impl FFmpegService {
    pub fn new(
        ffmpeg_path: String,
        ffprobe_path: String,
        probe_timeout: Duration,
        ffmpeg_timeout: Duration,
    ) -> Result<Self> {
        let processor = VideoProcessor::new(ffprobe_path, probe_timeout)
            .context("Failed to create VideoProcessor")?;
        let transformer = VideoTransformer::new(ffmpeg_path, ffmpeg_timeout)
            .context("Failed to create VideoTransformer")?;

        Ok(Self {
            processor,
            transformer,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.ffmpeg_path().to_string(),
            config.ffprobe_path().to_string(),
            config.probe_timeout(),
            config.ffmpeg_timeout(),
        )
    }
}

#[async_trait]
impl VideoToolkit for FFmpegService {
    async fn probe(&self, input: &Path) -> Result<VideoMetadata, ToolError> {
        self.processor.extract_metadata_from_path(input).await
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        bitrate_kbps: u32,
    ) -> Result<(), ToolError> {
        self.transformer.transcode(input, output, bitrate_kbps).await
    }

    async fn thumbnail(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.transformer.extract_thumbnail(input, output).await
    }

    async fn check_ffmpeg(&self) -> Result<(), ToolError> {
        self.transformer.check_available().await
    }

    async fn check_ffprobe(&self) -> Result<(), ToolError> {
        self.processor.check_available().await
    }
}
