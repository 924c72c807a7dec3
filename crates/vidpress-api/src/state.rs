//! Application state shared by all handlers.

use std::sync::Arc;
use vidpress_core::Config;
use vidpress_processing::{CompressionPipeline, TranscodeLimiter, VideoToolkit};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pipeline: CompressionPipeline,
    pub limiter: TranscodeLimiter,
}

impl AppState {
    /// Build state around any video toolkit. Production passes `FFmpegService`.
    pub fn new(config: Config, toolkit: Arc<dyn VideoToolkit>) -> Self {
        let limiter = TranscodeLimiter::new(
            config.max_concurrent_transcodes(),
            config.transcode_queue_timeout(),
        );
        Self {
            config,
            pipeline: CompressionPipeline::new(toolkit),
            limiter,
        }
    }

    pub fn toolkit(&self) -> &Arc<dyn VideoToolkit> {
        self.pipeline.toolkit()
    }
}
