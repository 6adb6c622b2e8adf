//! Service initialization and application state setup

use crate::auth::JwtService;
use crate::services::ingest::{ThumbnailIngestor, VideoIngestor, VideoUrlBuilder, VideoUrlResolver};
use crate::setup::storage::Stores;
use crate::state::{AppState, UploadLimits};
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tubely_core::Config;
use tubely_db::{PgVideoRepository, VideoRepository};
use tubely_processing::{FfmpegNormalizer, FfprobeProbe, MediaNormalizer, MediaProbe};

/// Wire repositories, media tools and storage into the application state
pub fn initialize_services(config: &Config, pool: PgPool, stores: Stores) -> Result<Arc<AppState>> {
    let videos: Arc<dyn VideoRepository> = Arc::new(PgVideoRepository::new(pool));
    let probe: Arc<dyn MediaProbe> = Arc::new(FfprobeProbe::new(config.ffprobe_path()));
    let normalizer: Arc<dyn MediaNormalizer> =
        Arc::new(FfmpegNormalizer::new(config.ffmpeg_path()));

    let temp_dir = config.upload_temp_dir();
    std::fs::create_dir_all(&temp_dir)
        .with_context(|| format!("Failed to create upload temp dir {}", temp_dir.display()))?;

    Ok(Arc::new(build_state(
        config,
        videos,
        stores,
        probe,
        normalizer,
    )))
}

/// Assemble `AppState` from already constructed dependencies.
pub fn build_state(
    config: &Config,
    videos: Arc<dyn VideoRepository>,
    stores: Stores,
    probe: Arc<dyn MediaProbe>,
    normalizer: Arc<dyn MediaNormalizer>,
) -> AppState {
    let urls = VideoUrlBuilder::new(
        config.video_url_style(),
        config.cdn_base_url().map(String::from),
    );

    let video_ingestor = VideoIngestor::new(
        videos.clone(),
        stores.videos.clone(),
        probe,
        normalizer,
        urls,
        config.upload_temp_dir(),
    )
    .with_partition_by_orientation(config.partition_by_orientation());

    let thumbnail_ingestor = ThumbnailIngestor::new(videos.clone(), stores.thumbnails);

    let url_resolver = VideoUrlResolver::new(
        stores.videos,
        Duration::from_secs(config.presign_ttl_secs()),
    );

    let jwt = JwtService::new(config.jwt_secret(), config.jwt_expiry_hours());

    tracing::info!(
        video_store = %config.video_store(),
        video_url_style = %config.video_url_style(),
        partition_by_orientation = config.partition_by_orientation(),
        "Services initialized"
    );

    AppState {
        videos,
        video_ingestor: Arc::new(video_ingestor),
        thumbnail_ingestor: Arc::new(thumbnail_ingestor),
        url_resolver,
        jwt,
        upload_limits: UploadLimits::default(),
    }
}
