//! Faststart normalization - moves the MP4 index to the front with ffmpeg

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tempfile::TempPath;
use thiserror::Error;
use tokio::process::Command;

/// Suffix appended to the input path to form the output path.
pub const PROCESSING_SUFFIX: &str = ".processing";

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Failed to execute ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("ffmpeg produced no output at {0}")]
    MissingOutput(PathBuf),
}

/// Path of the normalized copy of `input`: the input path plus `.processing`.
pub fn processing_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(PROCESSING_SUFFIX);
    PathBuf::from(name)
}

/// Rewrites a local media file for progressive playback.
///
/// The returned `TempPath` removes the output file when dropped.
#[async_trait]
pub trait MediaNormalizer: Send + Sync {
    async fn normalize(&self, input: &Path) -> Result<TempPath, NormalizeError>;
}

/// `MediaNormalizer` backed by the ffmpeg binary. Streams are copied, not re-encoded.
#[derive(Debug, Clone)]
pub struct FfmpegNormalizer {
    ffmpeg_path: String,
}

impl FfmpegNormalizer {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

impl Default for FfmpegNormalizer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl MediaNormalizer for FfmpegNormalizer {
    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffmpeg",
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "faststart"
    ))]
    async fn normalize(&self, input: &Path) -> Result<TempPath, NormalizeError> {
        let start = std::time::Instant::now();

        // Owns the output from here on, so partial writes are removed on any early return.
        let output_path = TempPath::from_path(processing_path(input));

        let output = Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(input)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&*output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(NormalizeError::Spawn)?;

        if !output.status.success() {
            return Err(NormalizeError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !tokio::fs::try_exists(&output_path).await.unwrap_or(false) {
            return Err(NormalizeError::MissingOutput(output_path.to_path_buf()));
        }

        tracing::debug!(
            duration_ms = start.elapsed().as_millis(),
            output = %output_path.display(),
            "Faststart normalization completed"
        );

        Ok(output_path)
    }
}
