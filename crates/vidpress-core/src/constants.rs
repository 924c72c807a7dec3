//! Fixed names and encoding parameters of the compression endpoint.

/// Name of the downloadable archive.
pub const ARCHIVE_FILENAME: &str = "video_and_thumbnail.zip";

/// Entry name of the re-encoded video inside the archive.
pub const ARCHIVE_VIDEO_ENTRY: &str = "compressed_video.mp4";

/// Entry name of the thumbnail inside the archive.
pub const ARCHIVE_THUMBNAIL_ENTRY: &str = "thumbnail.jpg";

/// Multipart field carrying the video file.
pub const VIDEO_FIELD: &str = "video";

/// Multipart field carrying the quality percentage.
pub const QUALITY_FIELD: &str = "quality";

pub const VIDEO_CODEC: &str = "libx264";
pub const AUDIO_CODEC: &str = "aac";
pub const AUDIO_BITRATE_KBPS: u32 = 128;
pub const ENCODER_PRESET: &str = "fast";
pub const KEYFRAME_INTERVAL: u32 = 50;
pub const CONTAINER_FORMAT: &str = "mp4";

/// Zip deflate level used for the archive (maximum compression).
pub const ARCHIVE_COMPRESSION_LEVEL: i32 = 9;
