//! Zip archive creation for the compressed video and its thumbnail.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use vidpress_core::constants::ARCHIVE_COMPRESSION_LEVEL;

/// One file to place in the archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub source: PathBuf,
    pub name: String,
}

impl ArchiveEntry {
    pub fn new(source: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: name.into(),
        }
    }
}

/// Write a deflated ZIP archive of `entries` to `destination` and finalize it.
///
/// Returns the archive size in bytes.
pub fn write_zip_archive(destination: &Path, entries: &[ArchiveEntry]) -> Result<u64> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let file = File::create(destination)
        .with_context(|| format!("Failed to create archive: {}", destination.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));

    for entry in entries {
        let mut source = File::open(&entry.source)
            .with_context(|| format!("Failed to open archive input: {}", entry.source.display()))?;
        let source_len = source.metadata()?.len();

        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(ARCHIVE_COMPRESSION_LEVEL))
            .unix_permissions(0o644)
            .large_file(source_len >= u32::MAX as u64);

        zip.start_file(entry.name.as_str(), options)
            .with_context(|| format!("Failed to add file to ZIP: {}", entry.name))?;
        std::io::copy(&mut source, &mut zip)
            .with_context(|| format!("Failed to write file data to ZIP: {}", entry.name))?;
    }

    let mut writer = zip.finish().context("Failed to finalize ZIP archive")?;
    writer.flush().context("Failed to flush ZIP archive")?;
    drop(writer);

    let size = std::fs::metadata(destination)?.len();
    Ok(size)
}

/// Async wrapper running [`write_zip_archive`] on the blocking pool.
pub async fn create_zip_archive(destination: PathBuf, entries: Vec<ArchiveEntry>) -> Result<u64> {
    tokio::task::spawn_blocking(move || write_zip_archive(&destination, &entries))
        .await
        .context("Archive task panicked")?
}
