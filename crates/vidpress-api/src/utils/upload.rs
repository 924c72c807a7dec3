//! Multipart intake for the compression endpoint.
//!
//! The `video` field is streamed straight to disk inside a fresh
//! [`ScratchDir`]; nothing is buffered whole in memory. The content type is
//! checked before the scratch directory exists, so a rejected upload leaves no
//! files behind.

use crate::error::HttpAppError;
use axum::extract::Multipart;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use vidpress_core::constants::{QUALITY_FIELD, VIDEO_FIELD};
use vidpress_core::{AppError, UploadedFile};
use vidpress_processing::ScratchDir;

/// What the form carried. `video` is `None` when no file field was sent.
#[derive(Debug)]
pub struct ReceivedUpload {
    pub video: Option<(ScratchDir, UploadedFile)>,
    pub quality: Option<String>,
}

/// Sanitize a client-supplied filename: keep only the base name and
/// replace anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// True for `video/*` MIME types (case-insensitive).
pub fn is_video_content_type(content_type: &str) -> bool {
    content_type
        .trim()
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("video/"))
}

/// Read every field of the form, streaming the video into a scratch directory.
pub async fn receive_video_upload(
    mut multipart: Multipart,
    scratch_root: &Path,
    max_size_bytes: usize,
) -> Result<ReceivedUpload, HttpAppError> {
    let mut video: Option<(ScratchDir, UploadedFile)> = None;
    let mut quality: Option<String> = None;

    while let Some(mut field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == VIDEO_FIELD && field.file_name().is_none() {
            // A plain text part is not a file upload.
            tracing::debug!("Ignoring video field without a filename");
        } else if field_name == VIDEO_FIELD {
            if video.is_some() {
                return Err(AppError::InvalidInput(
                    "Multiple video fields are not allowed; send exactly one field named 'video'"
                        .to_string(),
                )
                .into());
            }

            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            if !is_video_content_type(&content_type) {
                return Err(AppError::UnsupportedMediaType(format!(
                    "Only video files are allowed (got {})",
                    content_type
                ))
                .into());
            }
            let original_filename =
                sanitize_filename(field.file_name().unwrap_or("upload"));

            let scratch = ScratchDir::create_in(scratch_root).await?;
            let extension = Path::new(&original_filename)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("bin");
            let path = scratch.artifact_path("upload", extension);

            let mut file = tokio::fs::File::create(&path).await?;
            let mut size_bytes: u64 = 0;
            while let Some(chunk) = field.chunk().await? {
                size_bytes += chunk.len() as u64;
                if size_bytes > max_size_bytes as u64 {
                    return Err(AppError::PayloadTooLarge(format!(
                        "Video exceeds the maximum size of {} MB",
                        max_size_bytes / 1024 / 1024
                    ))
                    .into());
                }
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            drop(file);

            tracing::info!(
                filename = %original_filename,
                content_type = %content_type,
                size_bytes,
                "Video upload received"
            );

            video = Some((
                scratch,
                UploadedFile {
                    path,
                    size_bytes,
                    content_type,
                    original_filename,
                },
            ));
        } else if field_name == QUALITY_FIELD {
            quality = Some(field.text().await?);
        } else {
            tracing::debug!(field = %field_name, "Ignoring unknown form field");
        }
    }

    Ok(ReceivedUpload { video, quality })
}
