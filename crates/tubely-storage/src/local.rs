//! Filesystem backend, served over HTTP from `/assets`

use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::pin::Pin;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};

/// Stores objects as plain files under a root directory.
///
/// Keys map one-to-one onto relative paths (`portrait/abc.mp4` becomes
/// `{root}/portrait/abc.mp4`), and the URL of a key is `{base_url}/{key}`.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Open (creating if needed) a store rooted at `root` and served from `base_url`.
    pub async fn new(root: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Couldn't create asset directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a key to a path under the root.
    ///
    /// Only plain relative components are accepted, so a key can never name
    /// anything outside the root.
    fn resolve(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(storage_key);
        let plain = !storage_key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !plain {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn url_for(&self, storage_key: &str) -> String {
        format!("{}/{}", self.base_url, storage_key)
    }

    /// Write everything `reader` yields to the file behind `storage_key`,
    /// replacing any previous content.
    async fn write_from<R>(&self, storage_key: &str, reader: &mut R) -> StorageResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.resolve(storage_key)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }

        let write_failed =
            |e: std::io::Error| StorageError::UploadFailed(format!("{}: {}", path.display(), e));

        let mut file = fs::File::create(&path).await.map_err(write_failed)?;
        let written = tokio::io::copy(reader, &mut file)
            .await
            .map_err(write_failed)?;
        file.flush().await.map_err(write_failed)?;
        file.sync_all().await.map_err(write_failed)?;

        Ok(written)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let start = Instant::now();
        let written = self.write_from(storage_key, &mut data.as_slice()).await?;

        tracing::debug!(
            key = %storage_key,
            size_bytes = written,
            duration_ms = start.elapsed().as_millis(),
            "Asset written"
        );
        Ok(self.url_for(storage_key))
    }

    async fn upload_stream(
        &self,
        storage_key: &str,
        _content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let start = Instant::now();
        let written = self.write_from(storage_key, &mut reader).await?;

        tracing::info!(
            key = %storage_key,
            size_bytes = written,
            duration_ms = start.elapsed().as_millis(),
            "Asset streamed to disk"
        );
        Ok(self.url_for(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.resolve(storage_key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(key = %storage_key, "Asset removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        // Assets are served without signing.
        self.resolve(storage_key)?;
        Ok(self.url_for(storage_key))
    }

    fn public_url(&self, storage_key: &str) -> String {
        self.url_for(storage_key)
    }

    fn bucket(&self) -> Option<&str> {
        None
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const BASE_URL: &str = "http://localhost:8091/assets";

    async fn store_in(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, BASE_URL.to_string()).await.unwrap()
    }

    #[tokio::test]
    async fn upload_writes_file_and_returns_asset_url() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;

        let url = storage
            .upload_with_key("thumb.png", b"\x89PNG test".to_vec(), "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8091/assets/thumb.png");
        assert_eq!(std::fs::read(dir.path().join("thumb.png")).unwrap(), b"\x89PNG test");
    }

    #[tokio::test]
    async fn upload_replaces_existing_content() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;

        storage
            .upload_with_key("a.png", b"first, longer".to_vec(), "image/png")
            .await
            .unwrap();
        storage
            .upload_with_key("a.png", b"second".to_vec(), "image/png")
            .await
            .unwrap();

        assert_eq!(std::fs::read(dir.path().join("a.png")).unwrap(), b"second");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn keys_outside_the_root_are_rejected() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;

        for key in ["../../etc/passwd", "/etc/passwd", "a/../../b", ""] {
            let result = storage.upload_with_key(key, b"x".to_vec(), "image/png").await;
            assert!(
                matches!(result, Err(StorageError::InvalidKey(_))),
                "accepted {:?}",
                key
            );
        }
        assert!(matches!(
            storage.delete("../x.png").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_file_and_tolerates_missing_keys() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;

        storage
            .upload_with_key("gone.jpeg", b"x".to_vec(), "image/jpeg")
            .await
            .unwrap();
        storage.delete("gone.jpeg").await.unwrap();
        assert!(!dir.path().join("gone.jpeg").exists());

        storage.delete("never/written.mp4").await.unwrap();
    }

    #[tokio::test]
    async fn stream_upload_creates_partition_dir() {
        let dir = tempdir().unwrap();
        let storage = store_in(dir.path()).await;

        let data = b"fake mp4 bytes".to_vec();
        let reader: Pin<Box<dyn AsyncRead + Send + Unpin>> =
            Box::pin(std::io::Cursor::new(data.clone()));

        let url = storage
            .upload_stream("landscape/abc.mp4", "video/mp4", Some(data.len() as u64), reader)
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8091/assets/landscape/abc.mp4");
        assert_eq!(
            std::fs::read(dir.path().join("landscape").join("abc.mp4")).unwrap(),
            data
        );
    }

    #[tokio::test]
    async fn public_url_trims_trailing_slash() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), format!("{}/", BASE_URL))
            .await
            .unwrap();

        assert_eq!(
            storage.public_url("x.jpeg"),
            "http://localhost:8091/assets/x.jpeg"
        );
        assert!(storage.bucket().is_none());
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}
