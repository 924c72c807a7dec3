//! Bitrate planner
//!
//! Maps (file size, duration, quality percentage) to the video bitrate handed to
//! the encoder. The target size is `quality`% of the source size, spread evenly
//! over the duration.

use serde::Serialize;
use std::fmt;

/// Quality used when the form field is absent, empty, or not a number.
pub const DEFAULT_QUALITY: u8 = 50;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("Invalid video duration: {0} (must be a positive number of seconds)")]
    InvalidDuration(f64),

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("Quality must be between 1 and 100, got {0}")]
    QualityOutOfRange(i64),
}

/// Percentage of the original file size targeted by the encoder (1..=100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct QualityPercent(u8);

impl QualityPercent {
    pub fn new(value: i64) -> Result<Self, PlanError> {
        if (1..=100).contains(&value) {
            Ok(QualityPercent(value as u8))
        } else {
            Err(PlanError::QualityOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Interpret the raw `quality` form field.
    ///
    /// Leading integer digits are used the way a lenient form parser reads
    /// them (`"80%"` is 80). No digits at all means the default; a number
    /// outside 1..=100 is an error.
    pub fn parse_field(raw: Option<&str>, default: QualityPercent) -> Result<Self, PlanError> {
        let Some(raw) = raw else {
            return Ok(default);
        };
        let trimmed = raw.trim();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let digits: &str = {
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            &rest[..end]
        };
        if digits.is_empty() {
            return Ok(default);
        }

        let value = match digits.parse::<i64>() {
            Ok(v) if negative => -v,
            Ok(v) => v,
            Err(_) if negative => i64::MIN,
            Err(_) => i64::MAX,
        };
        QualityPercent::new(value)
    }
}

impl Default for QualityPercent {
    fn default() -> Self {
        QualityPercent(DEFAULT_QUALITY)
    }
}

impl fmt::Display for QualityPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Outcome of planning one compression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompressionPlan {
    pub quality: QualityPercent,
    pub source_size_mb: f64,
    pub target_size_mb: f64,
    pub target_bitrate_kbps: u32,
}

/// Compute the target bitrate for a source of `file_size_bytes` lasting
/// `duration_seconds`.
///
/// The result is floor-rounded and never below 1 kbps.
pub fn plan(
    file_size_bytes: u64,
    duration_seconds: f64,
    quality: QualityPercent,
) -> Result<CompressionPlan, PlanError> {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return Err(PlanError::InvalidDuration(duration_seconds));
    }
    if file_size_bytes == 0 {
        return Err(PlanError::EmptyFile);
    }

    let source_size_mb = file_size_bytes as f64 / (1024.0 * 1024.0);
    let target_size_mb = source_size_mb * (quality.value() as f64 / 100.0);
    let raw_kbps = (target_size_mb * 8.0 * 1024.0 / duration_seconds).floor();
    let target_bitrate_kbps = raw_kbps.clamp(1.0, u32::MAX as f64) as u32;

    Ok(CompressionPlan {
        quality,
        source_size_mb,
        target_size_mb,
        target_bitrate_kbps,
    })
}
