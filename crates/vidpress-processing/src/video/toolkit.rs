//! Seam between the pipeline and the external video tools.

use crate::process::ToolError;
use async_trait::async_trait;
use std::path::Path;
use vidpress_core::VideoMetadata;

/// The operations the compression pipeline needs from a video toolchain.
///
/// [`FFmpegService`](super::FFmpegService) is the production implementation.
#[async_trait]
pub trait VideoToolkit: Send + Sync {
    /// Read container metadata from `input`.
    async fn probe(&self, input: &Path) -> Result<VideoMetadata, ToolError>;

    /// Re-encode `input` into `output` at `bitrate_kbps`.
    async fn transcode(&self, input: &Path, output: &Path, bitrate_kbps: u32)
        -> Result<(), ToolError>;

    /// Write a single JPEG frame of `input` to `output`.
    async fn thumbnail(&self, input: &Path, output: &Path) -> Result<(), ToolError>;

    async fn check_ffmpeg(&self) -> Result<(), ToolError>;

    async fn check_ffprobe(&self) -> Result<(), ToolError>;
}
