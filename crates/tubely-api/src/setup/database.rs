//! Postgres pool and schema migrations

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tubely_core::Config;

const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

fn migrations_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations")
}

/// Connect the video metadata pool and bring the `videos` schema up to date.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(config.database_url())
        .await
        .context("Failed to connect to video metadata database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        acquire_timeout_secs = config.db_timeout_seconds(),
        "Video metadata database connected"
    );

    run_migrations(&pool).await?;
    Ok(pool)
}

async fn run_migrations(pool: &PgPool) -> Result<()> {
    let dir = migrations_dir();
    let migrator = sqlx::migrate::Migrator::new(dir.clone())
        .await
        .with_context(|| format!("Failed to load migrations from {}", dir.display()))?;
    migrator
        .run(pool)
        .await
        .context("Failed to apply videos schema migrations")?;

    tracing::info!(migrations = migrator.iter().count(), "Videos schema up to date");
    Ok(())
}
