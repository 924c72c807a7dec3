//! Video processor - metadata extraction via ffprobe

use crate::process::{run_tool, ToolError};
use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use vidpress_core::VideoMetadata;

const OPERATION: &str = "ffprobe";

/// Validate that a path doesn't contain shell metacharacters or dangerous sequences
pub(crate) fn validate_path(path: &str) -> Result<()> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(anyhow!("Path contains dangerous characters: {}", path));
    }

    if path.contains("..") {
        return Err(anyhow!("Path contains directory traversal: {}", path));
    }

    Ok(())
}

/// Validate an executable path: no shell metacharacters, plain path characters only.
pub(crate) fn validate_executable(path: &str, name: &str) -> Result<()> {
    if path.is_empty() {
        return Err(anyhow!("Invalid {}: empty path", name));
    }
    validate_path(path).with_context(|| format!("Invalid {}: contains dangerous characters", name))?;

    if !path.chars().all(|c| {
        c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
    }) {
        return Err(anyhow!("Invalid {}: contains unsafe characters", name));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct VideoProcessor {
    ffprobe_path: String,
    timeout: Duration,
}

impl VideoProcessor {
    pub fn new(ffprobe_path: String, timeout: Duration) -> Result<Self> {
        validate_executable(&ffprobe_path, "ffprobe_path")?;
        Ok(Self {
            ffprobe_path,
            timeout,
        })
    }

    /// Extract metadata from a file on disk.
    #[tracing::instrument(skip(self), fields(
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn extract_metadata_from_path(
        &self,
        video_path: &Path,
    ) -> Result<VideoMetadata, ToolError> {
        let start = std::time::Instant::now();

        let mut command = Command::new(&self.ffprobe_path);
        command
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(video_path);

        let output = run_tool(command, OPERATION, self.timeout).await?;
        let metadata = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            video_duration = metadata.duration,
            bitrate_kbps = metadata.bitrate_kbps,
            width = metadata.width,
            height = metadata.height,
            codec = metadata.codec.as_deref().unwrap_or("unknown"),
            "Video probe completed"
        );

        Ok(metadata)
    }

    /// Run `ffprobe -version`.
    pub async fn check_available(&self) -> Result<(), ToolError> {
        let mut command = Command::new(&self.ffprobe_path);
        command.arg("-version");
        run_tool(command, "ffprobe -version", self.timeout)
            .await
            .map(drop)
    }
}

fn invalid(message: impl Into<String>) -> ToolError {
    ToolError::InvalidOutput {
        operation: OPERATION,
        message: message.into(),
    }
}

/// Parse ffprobe's JSON report.
///
/// `format.duration` is required. `format.bit_rate` is reported in bits per
/// second and converted to kbps; stream fields are optional since audio-only
/// or oddly muxed files may lack a video stream.
pub fn parse_probe_output(stdout: &[u8]) -> Result<VideoMetadata, ToolError> {
    let probe_data: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| invalid(format!("Failed to parse ffprobe output: {}", e)))?;

    let format = probe_data
        .get("format")
        .ok_or_else(|| invalid("ffprobe reported no format section"))?;

    let duration = match &format["duration"] {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| invalid("Could not parse duration"))?;

    let bitrate_kbps = match &format["bit_rate"] {
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .map(|bps| bps / 1000.0);

    let stream = probe_data["streams"].get(0);
    let width = stream
        .and_then(|s| s["width"].as_u64())
        .and_then(|w| u32::try_from(w).ok());
    let height = stream
        .and_then(|s| s["height"].as_u64())
        .and_then(|h| u32::try_from(h).ok());
    let codec = stream
        .and_then(|s| s["codec_name"].as_str())
        .map(str::to_string);

    Ok(VideoMetadata {
        duration,
        bitrate_kbps,
        width,
        height,
        codec,
    })
}
