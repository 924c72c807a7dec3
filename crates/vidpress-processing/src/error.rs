//! Pipeline error taxonomy. Every variant is terminal for the request.

use vidpress_core::{PipelineStage, PlanError};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Probe failed: {0}")]
    Probe(String),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("Encode failed: {0}")]
    Encode(String),

    #[error("Thumbnail extraction failed: {0}")]
    Thumbnail(String),

    #[error("Archive creation failed: {0}")]
    Archive(String),

    #[error("{stage} exceeded its {seconds}s deadline")]
    Timeout { stage: PipelineStage, seconds: u64 },

    #[error("IO error during {stage}: {source}")]
    Io {
        stage: PipelineStage,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// The stage the request was in when it failed.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Probe(_) => PipelineStage::Probing,
            PipelineError::Plan(_) => PipelineStage::Planning,
            PipelineError::Encode(_) => PipelineStage::Transcoding,
            PipelineError::Thumbnail(_) => PipelineStage::Thumbnailing,
            PipelineError::Archive(_) => PipelineStage::Archiving,
            PipelineError::Timeout { stage, .. } | PipelineError::Io { stage, .. } => *stage,
        }
    }
}
