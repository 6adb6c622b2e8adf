use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::multipart::{ensure_content_length, parse_video_id};
use axum::{
    extract::{Multipart, Path, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::models::Video;

#[utoipa::path(
    post,
    path = "/api/videos/{videoID}/video",
    tag = "videos",
    params(
        ("videoID" = uuid::Uuid, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data", description = "MP4 file in the `video` field"),
    responses(
        (status = 200, description = "Video uploaded", body = Video),
        (status = 400, description = "Invalid ID, form or file type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(video_id): Path<String>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    ensure_content_length(&headers, state.upload_limits.video_bytes)?;
    let video_id = parse_video_id(&video_id)?;

    tracing::info!(video_id = %video_id, user_id = %user.user_id, "Uploading video");

    let video = state
        .video_ingestor
        .ingest(user.user_id, video_id, multipart)
        .await?;
    let video = state.url_resolver.resolve(video).await?;

    Ok(Json(video))
}
