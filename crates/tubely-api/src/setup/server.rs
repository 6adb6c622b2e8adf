//! Listener binding and graceful shutdown

use crate::constants::{MAX_THUMBNAIL_UPLOAD_BYTES, MAX_VIDEO_UPLOAD_BYTES};
use anyhow::{Context, Result};
use axum::Router;
use tubely_core::Config;

/// Serve `app` on `0.0.0.0:{PORT}` until Ctrl+C or SIGTERM.
///
/// In-flight uploads are allowed to finish; their temp files are released by
/// the ingestors as usual.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        addr = %addr,
        max_video_mb = MAX_VIDEO_UPLOAD_BYTES >> 20,
        max_thumbnail_mb = MAX_THUMBNAIL_UPLOAD_BYTES >> 20,
        video_store = %config.video_store(),
        thumbnail_store = %config.thumbnail_store(),
        video_url_style = %config.video_url_style(),
        ffprobe_path = %config.ffprobe_path(),
        ffmpeg_path = %config.ffmpeg_path(),
        public_base_url = %config.public_base_url(),
        "Tubely listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let signal = shutdown_signal().await;
            tracing::info!(signal, "Shutdown requested, draining connections");
        })
        .await
        .context("Server terminated with an error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves with the name of the first shutdown signal received.
///
/// # Panics
/// Panics if a signal handler cannot be installed.
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())
            .expect("install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
