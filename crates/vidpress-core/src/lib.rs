//! Vidpress Core Library
//!
//! This crate provides the domain models, error types, configuration, and the
//! bitrate planner shared by the processing and API crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod planner;

// Re-export commonly used types
pub use config::{Config, MediaServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{OutputArtifacts, PipelineStage, UploadedFile, VideoMetadata};
pub use planner::{plan, CompressionPlan, PlanError, QualityPercent};
