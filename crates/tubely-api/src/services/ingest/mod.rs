//! Upload ingestion
//!
//! One ingestor per media kind. Storage destinations and URL styles are chosen
//! once at startup and injected, so the request path never branches on
//! configuration.

mod asset_store;
mod thumbnail;
mod url;
mod video;

pub use asset_store::{AssetStore, InlineAssetStore, StorageAssetStore};
pub use thumbnail::ThumbnailIngestor;
pub use url::{parse_reference, reference_url, VideoUrlBuilder, VideoUrlResolver};
pub use video::VideoIngestor;

use tubely_core::{models::Video, AppError};
use tubely_db::VideoRepository;
use uuid::Uuid;

const VIDEO_NOT_FOUND: &str = "Couldn't find video";

/// Load `video_id` if it exists and belongs to `user_id`.
///
/// A record owned by someone else is reported exactly like a missing one.
pub async fn load_owned_video(
    videos: &dyn VideoRepository,
    video_id: Uuid,
    user_id: Uuid,
) -> Result<Video, AppError> {
    match videos.get_video(video_id).await? {
        Some(video) if video.is_owned_by(user_id) => Ok(video),
        Some(_) => {
            tracing::debug!(video_id = %video_id, user_id = %user_id, "Video belongs to another user");
            Err(AppError::NotFound(VIDEO_NOT_FOUND.to_string()))
        }
        None => Err(AppError::NotFound(VIDEO_NOT_FOUND.to_string())),
    }
}
