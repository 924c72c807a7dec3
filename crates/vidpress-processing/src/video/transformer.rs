//! Video transformer - ffmpeg re-encode and thumbnail extraction

use crate::process::{run_tool, ToolError};
use crate::video::processor::validate_executable;
use anyhow::Result;
use std::ffi::OsString;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use vidpress_core::constants::{
    AUDIO_BITRATE_KBPS, AUDIO_CODEC, CONTAINER_FORMAT, ENCODER_PRESET, KEYFRAME_INTERVAL,
    VIDEO_CODEC,
};

#[derive(Debug, Clone)]
pub struct VideoTransformer {
    ffmpeg_path: String,
    timeout: Duration,
}

impl VideoTransformer {
    pub fn new(ffmpeg_path: String, timeout: Duration) -> Result<Self> {
        validate_executable(&ffmpeg_path, "ffmpeg_path")?;
        Ok(Self {
            ffmpeg_path,
            timeout,
        })
    }

    /// Re-encode to H.264/AAC MP4 at the planned video bitrate.
    #[tracing::instrument(skip(self), fields(ffmpeg.operation = "transcode"))]
    pub async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        bitrate_kbps: u32,
    ) -> Result<(), ToolError> {
        let start = std::time::Instant::now();
        let mut command = Command::new(&self.ffmpeg_path);
        command.args(transcode_args(input, output, bitrate_kbps));

        run_tool(command, "ffmpeg transcode", self.timeout).await?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            bitrate_kbps,
            "Video transcode completed"
        );
        Ok(())
    }

    /// Extract the first frame as a JPEG.
    #[tracing::instrument(skip(self), fields(ffmpeg.operation = "thumbnail"))]
    pub async fn extract_thumbnail(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let start = std::time::Instant::now();
        let mut command = Command::new(&self.ffmpeg_path);
        command.args(thumbnail_args(input, output));

        run_tool(command, "ffmpeg thumbnail", self.timeout).await?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            "Thumbnail extraction completed"
        );
        Ok(())
    }

    /// Run `ffmpeg -version`.
    pub async fn check_available(&self) -> Result<(), ToolError> {
        let mut command = Command::new(&self.ffmpeg_path);
        command.arg("-version");
        run_tool(command, "ffmpeg -version", self.timeout)
            .await
            .map(drop)
    }
}

/// `ffmpeg` arguments for the re-encode. `-b:v` is the only video bitrate flag.
pub fn transcode_args(input: &Path, output: &Path, bitrate_kbps: u32) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(input.as_os_str().to_owned());
    args.extend(
        [
            "-c:v".to_string(),
            VIDEO_CODEC.to_string(),
            "-c:a".to_string(),
            AUDIO_CODEC.to_string(),
            "-b:v".to_string(),
            format!("{}k", bitrate_kbps),
            "-b:a".to_string(),
            format!("{}k", AUDIO_BITRATE_KBPS),
            "-preset".to_string(),
            ENCODER_PRESET.to_string(),
            "-g".to_string(),
            KEYFRAME_INTERVAL.to_string(),
            "-f".to_string(),
            CONTAINER_FORMAT.to_string(),
        ]
        .into_iter()
        .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}

/// `ffmpeg` arguments for a single-frame JPEG at t=0.
pub fn thumbnail_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y", "-ss", "0", "-i"]
        .into_iter()
        .map(OsString::from)
        .collect();
    args.push(input.as_os_str().to_owned());
    args.extend(
        ["-frames:v", "1", "-q:v", "2", "-update", "1"]
            .into_iter()
            .map(OsString::from),
    );
    args.push(output.as_os_str().to_owned());
    args
}
