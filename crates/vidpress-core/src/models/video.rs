//! Video request models

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A received upload, already written into the request's scratch directory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub content_type: String,
    pub original_filename: String,
}

impl UploadedFile {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Container metadata reported by the probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Duration in seconds.
    pub duration: f64,
    /// Source bitrate in kbps, when the container reports one.
    pub bitrate_kbps: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub codec: Option<String>,
}

/// Files produced by the transcode and thumbnail stages.
#[derive(Debug, Clone)]
pub struct OutputArtifacts {
    pub compressed_video: PathBuf,
    pub thumbnail: PathBuf,
}
