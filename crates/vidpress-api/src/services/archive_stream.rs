//! Streams a finished archive to the client and removes the request's scratch
//! directory once the body is done.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::Stream;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::io::ReaderStream;
use vidpress_core::constants::ARCHIVE_FILENAME;
use vidpress_processing::ScratchDir;

/// Read chunk size for the archive body.
const CHUNK_SIZE: usize = 64 * 1024;

/// Archive body that owns the scratch directory it reads from.
///
/// The directory is removed by a background task when the stream ends and by
/// `ScratchDir`'s drop if the client disconnects first. Neither blocks the
/// thread polling the body.
pub struct ArchiveStream {
    inner: ReaderStream<tokio::fs::File>,
    scratch: Option<ScratchDir>,
    sent_bytes: u64,
}

impl ArchiveStream {
    pub fn new(file: tokio::fs::File, scratch: ScratchDir) -> Self {
        Self {
            inner: ReaderStream::with_capacity(file, CHUNK_SIZE),
            scratch: Some(scratch),
            sent_bytes: 0,
        }
    }

    fn finish(&mut self) {
        let Some(scratch) = self.scratch.take() else {
            return;
        };
        let sent_bytes = self.sent_bytes;
        let path = scratch.path().to_path_buf();
        tokio::spawn(async move {
            match scratch.cleanup().await {
                Ok(()) => tracing::info!(
                    scratch_dir = %path.display(),
                    sent_bytes,
                    "Archive sent; temporary files removed"
                ),
                Err(e) => tracing::warn!(
                    scratch_dir = %path.display(),
                    error = %e,
                    "Archive sent but temporary files could not be removed"
                ),
            }
        });
    }
}

impl Stream for ArchiveStream {
    type Item = Result<Bytes, io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sent_bytes += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                // Headers are already out; all we can do is log and abort the body.
                tracing::error!(
                    error = %e,
                    sent_bytes = this.sent_bytes,
                    "Failed to stream archive"
                );
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Build the `200 application/zip` attachment response for `archive_path`.
pub async fn archive_response(
    scratch: ScratchDir,
    archive_path: &Path,
    archive_size_bytes: u64,
) -> io::Result<Response> {
    let file = tokio::fs::File::open(archive_path).await?;
    let body = Body::from_stream(ArchiveStream::new(file, scratch));

    let disposition = format!("attachment; filename=\"{}\"", ARCHIVE_FILENAME);
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/zip"),
        ),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_str(&disposition)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?,
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(archive_size_bytes)),
    ];

    Ok((StatusCode::OK, headers, body).into_response())
}
