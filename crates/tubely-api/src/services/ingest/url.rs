//! Video URL styles
//!
//! What goes into `video_url` at upload time, and how a stored value is turned
//! back into something a client can fetch.

use crate::error::HttpAppError;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::{models::Video, AppError, VideoUrlStyle};
use tubely_storage::Storage;

/// `"{bucket},{key}"`, stored when presigned URLs are minted per response.
pub fn reference_url(bucket: &str, key: &str) -> String {
    format!("{},{}", bucket, key)
}

/// Split a stored reference into bucket and key.
///
/// Anything with a scheme (`https://…`, `data:…`) is not a reference.
pub fn parse_reference(value: &str) -> Option<(&str, &str)> {
    if value.contains(':') {
        return None;
    }
    let (bucket, key) = value.split_once(',')?;
    if bucket.is_empty() || key.is_empty() {
        return None;
    }
    Some((bucket, key))
}

/// Builds the `video_url` stored for a newly uploaded object
#[derive(Debug, Clone)]
pub struct VideoUrlBuilder {
    style: VideoUrlStyle,
    cdn_base_url: Option<String>,
}

impl VideoUrlBuilder {
    pub fn new(style: VideoUrlStyle, cdn_base_url: Option<String>) -> Self {
        Self {
            style,
            cdn_base_url: cdn_base_url.map(|u| u.trim_end_matches('/').to_string()),
        }
    }

    pub fn style(&self) -> VideoUrlStyle {
        self.style
    }

    /// `public_url` is what the storage returned for the upload.
    pub fn record_url(
        &self,
        storage: &dyn Storage,
        key: &str,
        public_url: String,
    ) -> Result<String, AppError> {
        match self.style {
            VideoUrlStyle::Direct => Ok(public_url),
            VideoUrlStyle::Reference => storage
                .bucket()
                .map(|bucket| reference_url(bucket, key))
                .ok_or_else(|| {
                    AppError::Internal(
                        "Reference video URLs require an object store backend".to_string(),
                    )
                }),
            VideoUrlStyle::Cdn => self
                .cdn_base_url
                .as_deref()
                .map(|base| format!("{}/{}", base, key))
                .ok_or_else(|| AppError::Internal("CDN_BASE_URL not configured".to_string())),
        }
    }
}

/// Resolves stored references into presigned GET URLs for responses
#[derive(Clone)]
pub struct VideoUrlResolver {
    storage: Arc<dyn Storage>,
    ttl: Duration,
}

impl VideoUrlResolver {
    pub fn new(storage: Arc<dyn Storage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    /// Replace a reference `video_url` with a presigned URL. Other values pass
    /// through untouched.
    pub async fn resolve(&self, mut video: Video) -> Result<Video, HttpAppError> {
        let Some(stored) = video.video_url.as_deref() else {
            return Ok(video);
        };
        if stored.contains(':') {
            return Ok(video);
        }

        let Some((bucket, key)) = parse_reference(stored) else {
            tracing::warn!(video_id = %video.id, video_url = %stored, "Malformed video reference");
            return Ok(video);
        };
        if self.storage.bucket() != Some(bucket) {
            tracing::warn!(
                video_id = %video.id,
                bucket = %bucket,
                "Video reference points at an unknown bucket"
            );
            return Ok(video);
        }

        let signed = self.storage.get_presigned_url(key, self.ttl).await?;
        video.video_url = Some(signed);
        Ok(video)
    }

    pub async fn resolve_all(&self, videos: Vec<Video>) -> Result<Vec<Video>, HttpAppError> {
        let mut resolved = Vec::with_capacity(videos.len());
        for video in videos {
            resolved.push(self.resolve(video).await?);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_round_trip() {
        let stored = reference_url("tubely-1", "landscape/abc.mp4");
        assert_eq!(stored, "tubely-1,landscape/abc.mp4");
        assert_eq!(parse_reference(&stored), Some(("tubely-1", "landscape/abc.mp4")));
    }

    #[test]
    fn urls_are_not_references() {
        assert_eq!(parse_reference("https://b.s3.us-east-1.amazonaws.com/k.mp4"), None);
        assert_eq!(parse_reference("data:image/png;base64,AAAA"), None);
        assert_eq!(parse_reference("no-comma"), None);
        assert_eq!(parse_reference(",key"), None);
        assert_eq!(parse_reference("bucket,"), None);
    }
}
