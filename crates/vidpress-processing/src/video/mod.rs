//! Video tooling: ffprobe metadata, ffmpeg transcode and thumbnail.

pub mod processor;
pub mod service;
pub mod toolkit;
pub mod transformer;

pub use processor::VideoProcessor;
pub use service::FFmpegService;
pub use toolkit::VideoToolkit;
pub use transformer::VideoTransformer;
