use super::{load_owned_video, VideoUrlBuilder};
use crate::constants::{UPLOAD_TEMP_PREFIX, UPLOAD_TEMP_SUFFIX, VIDEO_FORM_FIELD};
use crate::error::HttpAppError;
use crate::utils::multipart::spool_field;
use axum::extract::Multipart;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tempfile::NamedTempFile;
use tokio::io::AsyncRead;
use tubely_core::{models::Video, AppError};
use tubely_db::VideoRepository;
use tubely_processing::{
    content_type::VIDEO_MP4, ContentTypeDescriptor, MediaNormalizer, MediaProbe,
};
use tubely_storage::{keys, Storage};
use uuid::Uuid;

/// Accepts an MP4 upload, prepares it for streaming and publishes it
///
/// The upload is spooled to a temp file, probed for orientation, rewritten
/// with the index up front and then streamed to storage. Every local file is
/// owned by an RAII guard, so nothing is left behind on any exit path,
/// including the request future being dropped.
pub struct VideoIngestor {
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    probe: Arc<dyn MediaProbe>,
    normalizer: Arc<dyn MediaNormalizer>,
    urls: VideoUrlBuilder,
    temp_dir: PathBuf,
    partition_by_orientation: bool,
}

impl VideoIngestor {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        probe: Arc<dyn MediaProbe>,
        normalizer: Arc<dyn MediaNormalizer>,
        urls: VideoUrlBuilder,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            videos,
            storage,
            probe,
            normalizer,
            urls,
            temp_dir,
            partition_by_orientation: true,
        }
    }

    pub fn with_partition_by_orientation(mut self, enabled: bool) -> Self {
        self.partition_by_orientation = enabled;
        self
    }

    #[tracing::instrument(skip(self, multipart), fields(url_style = %self.urls.style()))]
    pub async fn ingest(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        mut multipart: Multipart,
    ) -> Result<Video, HttpAppError> {
        let start = Instant::now();
        let mut video = load_owned_video(self.videos.as_ref(), video_id, user_id).await?;

        let (upload, size) = loop {
            let Some(mut field) = multipart.next_field().await? else {
                return Err(AppError::InvalidInput("Unable to parse form file".to_string()).into());
            };
            if field.name() != Some(VIDEO_FORM_FIELD) {
                continue;
            }

            // Checked before anything touches the disk.
            let content_type = ContentTypeDescriptor::parse_optional(field.content_type())?;
            content_type.ensure_allowed(&[VIDEO_MP4])?;

            let upload = self.create_temp_file()?;
            let std_file = upload.as_file().try_clone().map_err(|e| {
                AppError::Internal(format!("Couldn't open temp file: {}", e))
            })?;
            let mut file = tokio::fs::File::from_std(std_file);
            let size = spool_field(&mut field, &mut file).await?;
            break (upload, size);
        };

        tracing::debug!(
            video_id = %video_id,
            size_bytes = size,
            path = %upload.path().display(),
            "Upload spooled to disk"
        );

        let orientation = self.probe.probe_orientation(upload.path()).await?;
        let processed = self.normalizer.normalize(upload.path()).await?;

        let key = if self.partition_by_orientation {
            keys::generate_video_key(Some(orientation.as_str()))
        } else {
            keys::generate_video_key(None)
        };

        let public_url = self.publish(&key, &processed).await?;
        let record_url = self.urls.record_url(self.storage.as_ref(), &key, public_url)?;

        video.video_url = Some(record_url);
        let updated = match self.videos.update_video(&video).await {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(
                    video_id = %video_id,
                    key = %key,
                    error = %e,
                    "Video record update failed, uploaded object left orphaned"
                );
                return Err(e.into());
            }
        };

        tracing::info!(
            video_id = %video_id,
            user_id = %user_id,
            key = %key,
            orientation = %orientation,
            size_bytes = size,
            duration_ms = start.elapsed().as_millis(),
            "Video uploaded"
        );

        Ok(updated)
    }

    fn create_temp_file(&self) -> Result<NamedTempFile, AppError> {
        tempfile::Builder::new()
            .prefix(UPLOAD_TEMP_PREFIX)
            .suffix(UPLOAD_TEMP_SUFFIX)
            .tempfile_in(&self.temp_dir)
            .map_err(|e| AppError::Internal(format!("Couldn't create temp file: {}", e)))
    }

    async fn publish(&self, key: &str, path: &Path) -> Result<String, HttpAppError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| AppError::Internal(format!("Couldn't open processed file: {}", e)))?;
        let content_length = file.metadata().await.ok().map(|m| m.len());
        let reader: Pin<Box<dyn AsyncRead + Send + Unpin>> = Box::pin(file);

        let url = self
            .storage
            .upload_stream(key, VIDEO_MP4, content_length, reader)
            .await?;
        Ok(url)
    }
}
