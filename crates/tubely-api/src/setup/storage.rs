//! Storage setup and initialization

use crate::services::ingest::{AssetStore, InlineAssetStore, StorageAssetStore};
use anyhow::Result;
use std::sync::Arc;
use tubely_core::{Config, StoreStrategy};
use tubely_storage::{create_storage, create_storage_for, Storage};

/// Storage backends resolved from configuration
pub struct Stores {
    pub videos: Arc<dyn Storage>,
    pub thumbnails: Arc<dyn AssetStore>,
}

/// Setup the video storage backend and the thumbnail strategy.
///
/// A thumbnail strategy backed by the same kind of storage as videos shares
/// that backend instance.
pub async fn setup_storage(config: &Config) -> Result<Stores> {
    tracing::info!("Initializing storage abstraction...");
    let videos = create_storage(config).await?;
    tracing::info!(
        backend = ?videos.backend_type(),
        bucket = ?videos.bucket(),
        "Storage abstraction initialized successfully"
    );

    let strategy = config.thumbnail_store();
    let thumbnails = thumbnail_store(config, strategy, &videos).await?;
    tracing::info!(strategy = %strategy, "Thumbnail store initialized");

    Ok(Stores { videos, thumbnails })
}

async fn thumbnail_store(
    config: &Config,
    strategy: StoreStrategy,
    videos: &Arc<dyn Storage>,
) -> Result<Arc<dyn AssetStore>> {
    let Some(backend) = strategy.backend() else {
        return Ok(Arc::new(InlineAssetStore));
    };

    let storage = if videos.backend_type() == backend {
        videos.clone()
    } else {
        create_storage_for(config, backend).await?
    };
    Ok(Arc::new(StorageAssetStore::new(storage, strategy)))
}
