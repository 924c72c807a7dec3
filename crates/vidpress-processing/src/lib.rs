//! Vidpress Media Processing Library
//!
//! This crate drives the external ffprobe/ffmpeg tools, owns the per-request
//! scratch space, builds the output archive, and sequences them into the
//! compression pipeline.

pub mod admission;
pub mod archive;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod scratch;
pub mod video;

// Re-export commonly used types
pub use admission::{AdmissionError, TranscodeLimiter, TranscodePermit};
pub use archive::{create_zip_archive, ArchiveEntry};
pub use error::PipelineError;
pub use pipeline::{CompressionOutcome, CompressionPipeline};
pub use process::{run_tool, ToolError};
pub use scratch::ScratchDir;
pub use video::{FFmpegService, VideoProcessor, VideoToolkit, VideoTransformer};
