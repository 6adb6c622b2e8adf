//! Thumbnail destinations

use crate::error::HttpAppError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::sync::Arc;
use tubely_core::StoreStrategy;
use tubely_processing::{content_type::THUMBNAIL_CONTENT_TYPES, ContentTypeDescriptor};
use tubely_storage::{keys, Storage};
use uuid::Uuid;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Where a thumbnail ends up, and the URL recorded for it
#[async_trait]
pub trait AssetStore: Send + Sync {
    fn strategy(&self) -> StoreStrategy;

    async fn store_thumbnail(
        &self,
        video_id: Uuid,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<String, HttpAppError>;
}

/// Embeds the image in the record as a `data:` URI
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineAssetStore;

impl InlineAssetStore {
    pub fn data_uri(content_type: Option<&str>, data: &[u8]) -> String {
        let media_type = content_type
            .and_then(|ct| ContentTypeDescriptor::parse(ct).ok())
            .map(|ct| ct.essence().to_string())
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
        format!("data:{};base64,{}", media_type, STANDARD.encode(data))
    }
}

#[async_trait]
impl AssetStore for InlineAssetStore {
    fn strategy(&self) -> StoreStrategy {
        StoreStrategy::Inline
    }

    async fn store_thumbnail(
        &self,
        video_id: Uuid,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<String, HttpAppError> {
        tracing::debug!(video_id = %video_id, size_bytes = data.len(), "Inlining thumbnail");
        Ok(Self::data_uri(content_type, &data))
    }
}

/// Writes the image to a storage backend under `{video_id}.{ext}`
///
/// A video keeps a single thumbnail: the keys for the other allowed
/// extensions are removed once the new image is written.
#[derive(Clone)]
pub struct StorageAssetStore {
    storage: Arc<dyn Storage>,
    strategy: StoreStrategy,
}

impl StorageAssetStore {
    pub fn new(storage: Arc<dyn Storage>, strategy: StoreStrategy) -> Self {
        Self { storage, strategy }
    }

    async fn remove_superseded(
        &self,
        video_id: Uuid,
        current: &ContentTypeDescriptor,
    ) -> Result<(), HttpAppError> {
        for allowed in THUMBNAIL_CONTENT_TYPES {
            if current.is(allowed) {
                continue;
            }
            let other = ContentTypeDescriptor::parse(allowed)?;
            let key = keys::thumbnail_key(video_id, other.extension());
            self.storage.delete(&key).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl AssetStore for StorageAssetStore {
    fn strategy(&self) -> StoreStrategy {
        self.strategy
    }

    async fn store_thumbnail(
        &self,
        video_id: Uuid,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Result<String, HttpAppError> {
        let content_type = ContentTypeDescriptor::parse_optional(content_type)?;
        content_type.ensure_allowed(THUMBNAIL_CONTENT_TYPES)?;

        let key = keys::thumbnail_key(video_id, content_type.extension());
        let size = data.len();
        let url = self
            .storage
            .upload_with_key(&key, data, content_type.essence())
            .await?;
        self.remove_superseded(video_id, &content_type).await?;

        tracing::info!(
            video_id = %video_id,
            key = %key,
            size_bytes = size,
            strategy = %self.strategy,
            "Thumbnail stored"
        );
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubely_storage::LocalStorage;

    async fn local_store(dir: &std::path::Path) -> StorageAssetStore {
        let storage = LocalStorage::new(dir, "http://localhost:8091/assets".to_string())
            .await
            .unwrap();
        StorageAssetStore::new(Arc::new(storage), StoreStrategy::Local)
    }

    fn files_in(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn changing_type_replaces_previous_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let store = local_store(dir.path()).await;
        let video_id = Uuid::new_v4();

        let png_url = store
            .store_thumbnail(video_id, Some("image/png"), b"png".to_vec())
            .await
            .unwrap();
        let jpeg_url = store
            .store_thumbnail(video_id, Some("image/jpeg"), b"jpeg".to_vec())
            .await
            .unwrap();

        assert!(png_url.ends_with(".png"));
        assert!(jpeg_url.ends_with(".jpeg"));
        assert_eq!(files_in(dir.path()), vec![format!("{}.jpeg", video_id)]);
    }

    #[tokio::test]
    async fn other_videos_thumbnails_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = local_store(dir.path()).await;
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());

        store
            .store_thumbnail(first, Some("image/png"), b"a".to_vec())
            .await
            .unwrap();
        store
            .store_thumbnail(second, Some("image/jpeg"), b"b".to_vec())
            .await
            .unwrap();

        assert_eq!(files_in(dir.path()).len(), 2);
    }

    #[test]
    fn data_uri_uses_padded_standard_base64() {
        assert_eq!(
            InlineAssetStore::data_uri(Some("image/png"), b"ab"),
            "data:image/png;base64,YWI="
        );
    }

    #[test]
    fn data_uri_falls_back_to_octet_stream() {
        assert_eq!(
            InlineAssetStore::data_uri(None, b"abc"),
            "data:application/octet-stream;base64,YWJj"
        );
        assert_eq!(
            InlineAssetStore::data_uri(Some("garbage"), b"abc"),
            "data:application/octet-stream;base64,YWJj"
        );
    }

    #[test]
    fn data_uri_strips_parameters() {
        assert_eq!(
            InlineAssetStore::data_uri(Some("Image/JPEG; q=1"), b"abc"),
            "data:image/jpeg;base64,YWJj"
        );
    }
}
