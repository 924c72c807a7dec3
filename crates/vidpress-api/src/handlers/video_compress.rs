use crate::error::{ErrorResponse, HttpAppError};
use crate::services::archive_stream::archive_response;
use crate::state::AppState;
use crate::utils::upload::receive_video_upload;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use utoipa::ToSchema;
use vidpress_core::{AppError, PipelineStage, PlanError, QualityPercent};

/// Multipart form accepted by `POST /upload-video` (documentation only).
#[derive(Debug, Deserialize, ToSchema)]
#[allow(dead_code)]
pub struct VideoUploadForm {
    /// The video file. Its part content type must start with `video/`.
    #[schema(value_type = String, format = Binary)]
    pub video: Vec<u8>,
    /// Target size as a percentage (1-100) of the original. Defaults to 50.
    pub quality: Option<String>,
}

#[utoipa::path(
    post,
    path = "/upload-video",
    tag = "videos",
    request_body(content = VideoUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Zip archive with compressed_video.mp4 and thumbnail.jpg", body = Vec<u8>, content_type = "application/zip"),
        (status = 400, description = "No file uploaded, invalid quality, or unusable duration", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Upload is not a video", body = ErrorResponse),
        (status = 500, description = "Probe, encode, thumbnail or archive failure", body = ErrorResponse),
        (status = 503, description = "All transcode slots busy", body = ErrorResponse),
        (status = 504, description = "An external tool exceeded its deadline", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("upload_video", request.id = %request_id);
    handle_upload(&state, multipart).instrument(span).await
}

async fn handle_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpAppError> {
    let started = Instant::now();
    tracing::debug!(stage = %PipelineStage::ReceivingUpload, "Receiving upload");

    // A request that is not multipart carries no file either.
    let multipart =
        multipart.map_err(|_| AppError::BadRequest("No file uploaded.".to_string()))?;

    let received = receive_video_upload(
        multipart,
        state.config.scratch_dir(),
        state.config.max_video_size_bytes(),
    )
    .await?;

    let (scratch, upload) = received
        .video
        .ok_or_else(|| AppError::BadRequest("No file uploaded.".to_string()))?;

    if upload.size_bytes == 0 {
        return Err(PlanError::EmptyFile.into());
    }

    let default_quality =
        QualityPercent::new(i64::from(state.config.default_quality())).unwrap_or_default();
    let quality = QualityPercent::parse_field(received.quality.as_deref(), default_quality)?;

    let permit = state.limiter.acquire().await?;
    tracing::debug!(
        available_slots = state.limiter.available(),
        "Transcode slot acquired"
    );

    let outcome = state.pipeline.run(&scratch, &upload, quality).await;
    drop(permit);
    let outcome = outcome.map_err(|err| {
        tracing::warn!(
            stage = %PipelineStage::Error,
            failed_stage = %err.stage(),
            error = %err,
            elapsed_ms = started.elapsed().as_millis(),
            "Compression pipeline failed"
        );
        err
    })?;

    tracing::debug!(
        compressed_video = %outcome.artifacts.compressed_video.display(),
        thumbnail = %outcome.artifacts.thumbnail.display(),
        "Archived artifacts"
    );
    tracing::info!(
        stage = %PipelineStage::Archiving,
        original_size_mb = upload.size_mb(),
        duration_secs = outcome.metadata.duration,
        quality = quality.value(),
        target_bitrate_kbps = outcome.plan.target_bitrate_kbps,
        archive_size_bytes = outcome.archive_size_bytes,
        elapsed_ms = started.elapsed().as_millis(),
        "Video compressed; streaming archive"
    );

    let response = archive_response(scratch, &outcome.archive_path, outcome.archive_size_bytes)
        .await
        .map_err(|e| AppError::Archive(e.to_string()))?;

    Ok(response)
}
