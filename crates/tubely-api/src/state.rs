use crate::auth::JwtService;
use crate::constants::{MAX_THUMBNAIL_UPLOAD_BYTES, MAX_VIDEO_UPLOAD_BYTES};
use crate::services::ingest::{ThumbnailIngestor, VideoIngestor, VideoUrlResolver};
use std::sync::Arc;
use tubely_db::VideoRepository;

/// Request body ceilings for the upload routes, in bytes.
///
/// Enforced twice: against a declared `Content-Length` before the body is
/// read, and by the route's body limit while it streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub video_bytes: usize,
    pub thumbnail_bytes: usize,
}

impl UploadLimits {
    /// Largest body any upload route accepts.
    pub fn max_bytes(&self) -> usize {
        self.video_bytes.max(self.thumbnail_bytes)
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            video_bytes: MAX_VIDEO_UPLOAD_BYTES,
            thumbnail_bytes: MAX_THUMBNAIL_UPLOAD_BYTES,
        }
    }
}

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoRepository>,
    pub video_ingestor: Arc<VideoIngestor>,
    pub thumbnail_ingestor: Arc<ThumbnailIngestor>,
    pub url_resolver: VideoUrlResolver,
    pub jwt: JwtService,
    pub upload_limits: UploadLimits,
}
