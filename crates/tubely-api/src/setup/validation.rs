//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use tubely_core::{Config, VideoUrlStyle};

/// Validate critical configuration values
///
/// Runs the config's own consistency checks plus limits that only matter to
/// the HTTP server.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    let is_production = config.is_production();

    if is_production && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.db_max_connections() == 0 {
        return Err(anyhow::anyhow!("Database max connections cannot be 0"));
    }

    if config.db_timeout_seconds() == 0 {
        return Err(anyhow::anyhow!("Database timeout cannot be 0"));
    }

    if config.jwt_expiry_hours() <= 0 {
        return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be positive"));
    }

    if config.video_url_style() == VideoUrlStyle::Reference && config.presign_ttl_secs() == 0 {
        return Err(anyhow::anyhow!(
            "PRESIGN_TTL_SECS cannot be 0 when VIDEO_URL_STYLE=reference"
        ));
    }

    if is_production && config.public_base_url().starts_with("http://localhost") {
        tracing::warn!(
            public_base_url = %config.public_base_url(),
            "PUBLIC_BASE_URL points at localhost in production - local asset URLs will not resolve for clients"
        );
    }

    tracing::info!("Configuration validation passed");
    Ok(())
}
