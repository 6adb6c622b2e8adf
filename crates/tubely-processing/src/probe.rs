//! Orientation probing - reads stream dimensions with ffprobe

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::process::Command;

/// Absolute tolerance when matching a ratio against 16:9 or 9:16.
pub const RATIO_TOLERANCE: f64 = 0.01;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to execute ffprobe: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffprobe exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("Failed to parse ffprobe output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    #[error("No stream with dimensions found")]
    NoVideoStream,

    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u64, height: u64 },
}

/// Orientation class derived from a video's aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Other,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Other => "other",
        }
    }

    /// `landscape` within tolerance of 16:9, `portrait` within tolerance of 9:16.
    pub fn from_ratio(ratio: f64) -> Self {
        if (ratio - LANDSCAPE_RATIO).abs() <= RATIO_TOLERANCE {
            Orientation::Landscape
        } else if (ratio - PORTRAIT_RATIO).abs() <= RATIO_TOLERANCE {
            Orientation::Portrait
        } else {
            Orientation::Other
        }
    }
}

impl Display for Orientation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Width over height.
pub fn aspect_ratio(width: u64, height: u64) -> Result<f64, ProbeError> {
    if height == 0 {
        return Err(ProbeError::InvalidDimensions { width, height });
    }
    Ok(width as f64 / height as f64)
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u64>,
    height: Option<u64>,
}

impl ProbeStream {
    fn dimensions(&self) -> Option<(u64, u64)> {
        Some((self.width?, self.height?))
    }
}

/// Classify the orientation described by `ffprobe -print_format json -show_streams` output.
///
/// The first video stream wins; otherwise the first stream carrying both
/// dimensions is used.
pub fn orientation_from_probe_json(stdout: &[u8]) -> Result<Orientation, ProbeError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)?;

    let (width, height) = output
        .streams
        .iter()
        .filter(|s| s.codec_type.as_deref() == Some("video"))
        .find_map(ProbeStream::dimensions)
        .or_else(|| output.streams.iter().find_map(ProbeStream::dimensions))
        .ok_or(ProbeError::NoVideoStream)?;

    Ok(Orientation::from_ratio(aspect_ratio(width, height)?))
}

/// Determines the orientation of a local media file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe_orientation(&self, path: &Path) -> Result<Orientation, ProbeError>;
}

/// `MediaProbe` backed by the ffprobe binary.
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe_path: String,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

impl Default for FfprobeProbe {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    async fn probe_orientation(&self, path: &Path) -> Result<Orientation, ProbeError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ProbeError::Spawn)?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let orientation = orientation_from_probe_json(&output.stdout)?;

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            orientation = %orientation,
            "Video probe completed"
        );

        Ok(orientation)
    }
}
