//! Storage abstraction trait
//!
//! Backends only need the operations the ingestors perform: writes, removal
//! of superseded thumbnails and URL generation. Reads go through the public
//! or presigned URL, never through the trait.

use crate::StorageBackend;
use async_trait::async_trait;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// ingestors can publish content without knowing where it lands. Callers pick
/// the key (see the `keys` module); writes to an existing key overwrite it.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload an in-memory payload to `storage_key`.
    /// Returns the public URL for the uploaded file.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Upload from a reader (for large files) to `storage_key`.
    ///
    /// The reader is consumed until EOF without buffering the whole content in
    /// memory. `content_length` is a hint only. Returns the public URL.
    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        content_length: Option<u64>,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String>;

    /// Remove `storage_key`. Removing a key that was never written succeeds.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Generate a presigned/temporary URL for direct access (GET)
    ///
    /// Backends without signing return the public URL.
    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Public URL of `storage_key`, whether or not it exists yet.
    fn public_url(&self, storage_key: &str) -> String;

    /// Bucket name for object store backends.
    fn bucket(&self) -> Option<&str>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
