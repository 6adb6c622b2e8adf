use super::{load_owned_video, AssetStore};
use crate::constants::THUMBNAIL_FORM_FIELD;
use crate::error::HttpAppError;
use axum::extract::Multipart;
use std::sync::Arc;
use tubely_core::{models::Video, AppError};
use tubely_db::VideoRepository;
use uuid::Uuid;

/// Accepts a thumbnail image and records its URL on the video
pub struct ThumbnailIngestor {
    videos: Arc<dyn VideoRepository>,
    store: Arc<dyn AssetStore>,
}

impl ThumbnailIngestor {
    pub fn new(videos: Arc<dyn VideoRepository>, store: Arc<dyn AssetStore>) -> Self {
        Self { videos, store }
    }

    #[tracing::instrument(skip(self, multipart), fields(strategy = %self.store.strategy()))]
    pub async fn ingest(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        mut multipart: Multipart,
    ) -> Result<Video, HttpAppError> {
        let mut video = load_owned_video(self.videos.as_ref(), video_id, user_id).await?;

        let (content_type, data) = loop {
            let Some(field) = multipart.next_field().await? else {
                return Err(AppError::InvalidInput("Unable to parse form file".to_string()).into());
            };
            if field.name() != Some(THUMBNAIL_FORM_FIELD) {
                continue;
            }
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await?;
            break (content_type, data.to_vec());
        };

        let url = self
            .store
            .store_thumbnail(video_id, content_type.as_deref(), data)
            .await?;

        video.thumbnail_url = Some(url);
        let updated = self.videos.update_video(&video).await?;

        tracing::info!(video_id = %video_id, user_id = %user_id, "Thumbnail uploaded");
        Ok(updated)
    }
}
