//! In-memory stand-ins for the database, object store and media tools.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempPath;
use tokio::io::{AsyncRead, AsyncReadExt};
use tubely_core::{models::Video, AppError, StorageBackend};
use tubely_db::VideoRepository;
use tubely_processing::normalize::processing_path;
use tubely_processing::{MediaNormalizer, MediaProbe, NormalizeError, Orientation, ProbeError};
use tubely_storage::{Storage, StorageResult};
use uuid::Uuid;

pub const TEST_BUCKET: &str = "tubely-test";
pub const TEST_REGION: &str = "us-east-1";

#[derive(Default)]
pub struct MockVideoRepository {
    videos: Mutex<HashMap<Uuid, Video>>,
    updates: AtomicUsize,
    fail_updates: AtomicBool,
}

impl MockVideoRepository {
    pub fn insert(&self, video: Video) {
        self.videos.lock().unwrap().insert(video.id, video);
    }

    pub fn get(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl VideoRepository for MockVideoRepository {
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.get(id))
    }

    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut videos = self.videos.lock().unwrap();
        let stored = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;
        *stored = Video {
            updated_at: chrono::Utc::now(),
            ..video.clone()
        };
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(stored.clone())
    }

    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        self.insert(video.clone());
        Ok(video.clone())
    }

    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let mut videos: Vec<Video> = self
            .videos
            .lock()
            .unwrap()
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }
}

/// Object store double that keeps every put in memory.
#[derive(Default)]
pub struct RecordingStorage {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    puts: AtomicUsize,
    deleted: Mutex<Vec<String>>,
}

impl RecordingStorage {
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn object(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    /// Every key passed to `delete`, in call order.
    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> String {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.public_url(key)
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        Ok(self.put(storage_key, data, content_type))
    }

    async fn upload_stream(
        &self,
        storage_key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<String> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        Ok(self.put(storage_key, data, content_type))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(storage_key);
        self.deleted.lock().unwrap().push(storage_key.to_string());
        Ok(())
    }

    async fn get_presigned_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        Ok(format!(
            "{}?X-Amz-Expires={}",
            self.public_url(storage_key),
            expires_in.as_secs()
        ))
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            TEST_BUCKET, TEST_REGION, storage_key
        )
    }

    fn bucket(&self) -> Option<&str> {
        Some(TEST_BUCKET)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Reports a fixed orientation, or fails when built with `failing()`.
pub struct FakeProbe {
    orientation: Orientation,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeProbe {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Orientation::Other)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProbe for FakeProbe {
    async fn probe_orientation(&self, path: &Path) -> Result<Orientation, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(path.exists(), "probed a missing file");
        if self.fail {
            return Err(ProbeError::NoVideoStream);
        }
        Ok(self.orientation)
    }
}

/// Copies the input next to itself, the way ffmpeg writes `<path>.processing`.
///
/// Built with `failing()` it leaves a partial output behind and errors, like
/// an ffmpeg run that dies mid-write.
#[derive(Default)]
pub struct FakeNormalizer {
    fail: bool,
    calls: AtomicUsize,
}

impl FakeNormalizer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaNormalizer for FakeNormalizer {
    async fn normalize(&self, input: &Path) -> Result<TempPath, NormalizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let output = TempPath::from_path(processing_path(input));
        if self.fail {
            tokio::fs::write(&output, b"partial")
                .await
                .map_err(NormalizeError::Spawn)?;
            return Err(NormalizeError::MissingOutput(output.to_path_buf()));
        }
        tokio::fs::copy(input, &output)
            .await
            .map_err(NormalizeError::Spawn)?;
        Ok(output)
    }
}
