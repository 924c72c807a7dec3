//! Per-request domain models. Nothing here outlives a single request.

pub mod stage;
pub mod video;

pub use stage::PipelineStage;
pub use video::{OutputArtifacts, UploadedFile, VideoMetadata};
