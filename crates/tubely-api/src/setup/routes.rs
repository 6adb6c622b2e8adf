//! Router construction

use crate::api_doc::{ApiDoc, OPENAPI_JSON_PATH};
use crate::auth::auth_middleware;
use crate::constants::{HTTP_CONCURRENCY_LIMIT, MAX_JSON_BODY_BYTES};
use crate::handlers::{health, thumbnail_upload, video_upload, videos};
use crate::state::{AppState, UploadLimits};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tubely_core::{Config, StorageBackend, StoreStrategy};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let limits = state.upload_limits;

    let protected_routes = protected_routes(limits).layer(axum::middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let mut app = public_routes()
        .merge(protected_routes)
        .merge(RapiDoc::new(OPENAPI_JSON_PATH).path("/docs"));

    if serves_local_assets(config) {
        tracing::info!(
            assets_root = %config.assets_root().display(),
            "Serving local assets at /assets"
        );
        app = app.nest_service("/assets", ServeDir::new(config.assets_root()));
    }

    let app = app
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(limits.max_bytes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

fn serves_local_assets(config: &Config) -> bool {
    config.video_store() == StorageBackend::Local
        || config.thumbnail_store() == StoreStrategy::Local
}

fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/healthz", get(health::liveness_check))
        .route(
            OPENAPI_JSON_PATH,
            get(|| async { Json(ApiDoc::openapi()) }),
        )
}

fn protected_routes(limits: UploadLimits) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/videos",
            post(videos::create_video)
                .get(videos::list_videos)
                .layer(DefaultBodyLimit::max(MAX_JSON_BODY_BYTES)),
        )
        .route("/api/videos/{videoID}", get(videos::get_video))
        .route(
            "/api/videos/{videoID}/video",
            post(video_upload::upload_video).layer(DefaultBodyLimit::max(limits.video_bytes)),
        )
        .route(
            "/api/videos/{videoID}/thumbnail",
            post(thumbnail_upload::upload_thumbnail)
                .layer(DefaultBodyLimit::max(limits.thumbnail_bytes)),
        )
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
