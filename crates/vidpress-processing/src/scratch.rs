//! Per-request scratch directory.
//!
//! Every request writes its upload, compressed video, thumbnail and archive
//! into its own uniquely named directory under the configured scratch root.
//! The directory is removed when the `ScratchDir` is cleaned up or dropped, so
//! no exit path (success, stage failure, client disconnect) leaves files behind.

use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct ScratchDir {
    dir: Option<TempDir>,
    path: PathBuf,
    created_ms: i64,
}

impl ScratchDir {
    /// Create a fresh directory under `root`, creating `root` if needed.
    pub async fn create_in(root: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(root).await?;
        let root = root.to_path_buf();
        let dir = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new().prefix("req-").tempdir_in(&root)
        })
        .await
        .map_err(io::Error::other)??;

        let path = dir.path().to_path_buf();
        tracing::debug!(scratch_dir = %path.display(), "Scratch directory created");

        Ok(Self {
            dir: Some(dir),
            path,
            created_ms: Utc::now().timestamp_millis(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a derived artifact, suffixed with the request's creation
    /// timestamp: `artifact_path("compressed", "mp4")` → `compressed_<ms>.mp4`.
    pub fn artifact_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.path
            .join(format!("{}_{}.{}", stem, self.created_ms, extension))
    }

    /// Remove the directory and everything in it on the blocking pool.
    pub async fn cleanup(mut self) -> io::Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };
        tokio::task::spawn_blocking(move || dir.close())
            .await
            .map_err(io::Error::other)??;
        tracing::debug!(scratch_dir = %self.path.display(), "Scratch directory removed");
        Ok(())
    }
}

fn remove_logged(dir: TempDir, path: PathBuf) {
    match dir.close() {
        Ok(()) => tracing::debug!(
            scratch_dir = %path.display(),
            "Scratch directory removed on drop"
        ),
        Err(e) => tracing::warn!(
            scratch_dir = %path.display(),
            error = %e,
            "Failed to remove scratch directory"
        ),
    }
}

impl Drop for ScratchDir {
    // Inside a runtime the removal goes to the blocking pool. If that pool is
    // already shut down the closure is dropped and `TempDir`'s own drop
    // removes the directory.
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = self.path.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || remove_logged(dir, path));
            }
            Err(_) => remove_logged(dir, path),
        }
    }
}

impl std::fmt::Debug for ScratchDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScratchDir")
            .field("path", &self.path)
            .field("live", &self.dir.is_some())
            .finish()
    }
}
