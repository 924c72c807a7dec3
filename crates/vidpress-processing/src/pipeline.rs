//! Compression pipeline: probe → plan → transcode → thumbnail → archive.
//!
//! Each stage is awaited in order; the first failure ends the run. All files
//! are written inside the caller's [`ScratchDir`], so cleanup is the caller's
//! single `ScratchDir` drop.

use crate::archive::{create_zip_archive, ArchiveEntry};
use crate::error::PipelineError;
use crate::process::ToolError;
use crate::scratch::ScratchDir;
use crate::video::VideoToolkit;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use vidpress_core::constants::{ARCHIVE_THUMBNAIL_ENTRY, ARCHIVE_VIDEO_ENTRY};
use vidpress_core::{
    plan, CompressionPlan, OutputArtifacts, PipelineStage, QualityPercent, UploadedFile,
    VideoMetadata,
};

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct CompressionOutcome {
    pub metadata: VideoMetadata,
    pub plan: CompressionPlan,
    pub artifacts: OutputArtifacts,
    pub archive_path: PathBuf,
    pub archive_size_bytes: u64,
}

#[derive(Clone)]
pub struct CompressionPipeline {
    toolkit: Arc<dyn VideoToolkit>,
}

impl CompressionPipeline {
    pub fn new(toolkit: Arc<dyn VideoToolkit>) -> Self {
        Self { toolkit }
    }

    pub fn toolkit(&self) -> &Arc<dyn VideoToolkit> {
        &self.toolkit
    }

    #[tracing::instrument(skip_all, fields(
        scratch_dir = %scratch.path().display(),
        upload.size_bytes = upload.size_bytes,
        quality = quality.value()
    ))]
    pub async fn run(
        &self,
        scratch: &ScratchDir,
        upload: &UploadedFile,
        quality: QualityPercent,
    ) -> Result<CompressionOutcome, PipelineError> {
        let start = Instant::now();

        let stage = PipelineStage::Probing;
        tracing::debug!(stage = %stage, "Pipeline stage started");
        let metadata = self
            .toolkit
            .probe(&upload.path)
            .await
            .map_err(|e| tool_failure(stage, e, PipelineError::Probe))?;

        let stage = PipelineStage::Planning;
        let file_size = tokio::fs::metadata(&upload.path)
            .await
            .map_err(|source| PipelineError::Io { stage, source })?
            .len();
        let plan = plan(file_size, metadata.duration, quality)?;
        tracing::info!(
            stage = %stage,
            duration_secs = metadata.duration,
            source_size_mb = plan.source_size_mb,
            target_size_mb = plan.target_size_mb,
            target_bitrate_kbps = plan.target_bitrate_kbps,
            "Compression planned"
        );

        let stage = PipelineStage::Transcoding;
        tracing::debug!(stage = %stage, "Pipeline stage started");
        let compressed_video = scratch.artifact_path("compressed", "mp4");
        self.toolkit
            .transcode(&upload.path, &compressed_video, plan.target_bitrate_kbps)
            .await
            .map_err(|e| tool_failure(stage, e, PipelineError::Encode))?;
        ensure_output(&compressed_video, stage, PipelineError::Encode).await?;

        let stage = PipelineStage::Thumbnailing;
        tracing::debug!(stage = %stage, "Pipeline stage started");
        let thumbnail = scratch.artifact_path("thumbnail", "jpg");
        self.toolkit
            .thumbnail(&upload.path, &thumbnail)
            .await
            .map_err(|e| tool_failure(stage, e, PipelineError::Thumbnail))?;
        ensure_output(&thumbnail, stage, PipelineError::Thumbnail).await?;

        let stage = PipelineStage::Archiving;
        tracing::debug!(stage = %stage, "Pipeline stage started");
        let archive_path = scratch.artifact_path("video_and_thumbnail", "zip");
        let archive_size_bytes = create_zip_archive(
            archive_path.clone(),
            vec![
                ArchiveEntry::new(&compressed_video, ARCHIVE_VIDEO_ENTRY),
                ArchiveEntry::new(&thumbnail, ARCHIVE_THUMBNAIL_ENTRY),
            ],
        )
        .await
        .map_err(|e| PipelineError::Archive(format!("{:#}", e)))?;

        tracing::info!(
            archive_size_bytes,
            elapsed_ms = start.elapsed().as_millis(),
            "Compression pipeline finished"
        );

        Ok(CompressionOutcome {
            metadata,
            plan,
            artifacts: OutputArtifacts {
                compressed_video,
                thumbnail,
            },
            archive_path,
            archive_size_bytes,
        })
    }
}

fn tool_failure(
    stage: PipelineStage,
    error: ToolError,
    wrap: fn(String) -> PipelineError,
) -> PipelineError {
    match error {
        ToolError::TimedOut { timeout, .. } => PipelineError::Timeout {
            stage,
            seconds: timeout.as_secs(),
        },
        other => wrap(other.to_string()),
    }
}

/// A tool that exits cleanly without writing its output is still a failure.
async fn ensure_output(
    path: &Path,
    stage: PipelineStage,
    wrap: fn(String) -> PipelineError,
) -> Result<(), PipelineError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.len() > 0 => Ok(()),
        Ok(_) => Err(wrap(format!("{} produced an empty file", stage))),
        Err(e) => Err(wrap(format!("{} produced no output: {}", stage, e))),
    }
}
