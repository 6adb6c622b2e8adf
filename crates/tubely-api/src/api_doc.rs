//! OpenAPI documentation, served through RapiDoc at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use tubely_core::models;

/// Where the generated document is served.
pub const OPENAPI_JSON_PATH: &str = "/api/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video publishing API. Upload MP4 videos, which are probed, prepared for fast start and stored under unguessable keys, and attach thumbnails to them. All endpoints except the health check require a bearer token."
    ),
    paths(
        handlers::videos::create_video,
        handlers::videos::list_videos,
        handlers::videos::get_video,
        handlers::video_upload::upload_video,
        handlers::thumbnail_upload::upload_thumbnail,
        handlers::health::liveness_check,
    ),
    components(
        schemas(
            models::Video,
            models::CreateVideoRequest,
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "videos", description = "Video records, uploads and thumbnails"),
        (name = "health", description = "Process health")
    )
)]
pub struct ApiDoc;
