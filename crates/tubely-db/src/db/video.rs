use async_trait::async_trait;
use sqlx::{PgPool, Postgres};
use tubely_core::{models::Video, AppError};
use uuid::Uuid;

const VIDEO_COLUMNS: &str =
    "id, created_at, updated_at, title, description, thumbnail_url, video_url, user_id";

/// Persistence for video records
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Fetch a record by id, regardless of owner.
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Persist every mutable field of `video` and return the stored record.
    async fn update_video(&self, video: &Video) -> Result<Video, AppError>;

    async fn create_video(&self, video: &Video) -> Result<Video, AppError>;

    /// Records owned by `user_id`, newest first.
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError>;
}

/// Repository for video records in Postgres
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select", db.record_id = %id))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE id = $1",
            VIDEO_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "update", db.record_id = %video.id))]
    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        let updated = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            UPDATE videos
            SET title = $2, description = $3, thumbnail_url = $4, video_url = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", db.operation = "insert", db.record_id = %video.id))]
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        let created = sqlx::query_as::<Postgres, Video>(&format!(
            r#"
            INSERT INTO videos (id, created_at, updated_at, title, description, thumbnail_url, video_url, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            VIDEO_COLUMNS
        ))
        .bind(video.id)
        .bind(video.created_at)
        .bind(video.updated_at)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos", db.operation = "select"))]
    async fn list_videos_for_user(&self, user_id: Uuid) -> Result<Vec<Video>, AppError> {
        let videos = sqlx::query_as::<Postgres, Video>(&format!(
            "SELECT {} FROM videos WHERE user_id = $1 ORDER BY created_at DESC",
            VIDEO_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }
}
