//! Stages of the upload → archive pipeline.

use std::fmt;

/// Where a request currently is in the compression pipeline.
///
/// Stages only move forward. Any stage may move to `Error`, which is terminal
/// for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PipelineStage {
    ReceivingUpload,
    Probing,
    Planning,
    Transcoding,
    Thumbnailing,
    Archiving,
    Cleanup,
    Done,
    Error,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::ReceivingUpload => "receiving_upload",
            PipelineStage::Probing => "probing",
            PipelineStage::Planning => "planning",
            PipelineStage::Transcoding => "transcoding",
            PipelineStage::Thumbnailing => "thumbnailing",
            PipelineStage::Archiving => "archiving",
            PipelineStage::Cleanup => "cleanup",
            PipelineStage::Done => "done",
            PipelineStage::Error => "error",
        }
    }

    /// The stage that follows this one on the success path.
    pub fn next(self) -> Option<PipelineStage> {
        match self {
            PipelineStage::ReceivingUpload => Some(PipelineStage::Probing),
            PipelineStage::Probing => Some(PipelineStage::Planning),
            PipelineStage::Planning => Some(PipelineStage::Transcoding),
            PipelineStage::Transcoding => Some(PipelineStage::Thumbnailing),
            PipelineStage::Thumbnailing => Some(PipelineStage::Archiving),
            PipelineStage::Archiving => Some(PipelineStage::Cleanup),
            PipelineStage::Cleanup => Some(PipelineStage::Done),
            PipelineStage::Done | PipelineStage::Error => None,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
