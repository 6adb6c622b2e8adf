use crate::auth::models::UserContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::ingest::load_owned_video;
use crate::state::AppState;
use crate::utils::multipart::parse_video_id;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tubely_core::models::{CreateVideoRequest, Video};
use tubely_core::AppError;

#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    request_body = CreateVideoRequest,
    responses(
        (status = 201, description = "Video draft created", body = Video),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(user_id = %user.user_id, operation = "create_video"))]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<CreateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidInput("Title is required".to_string()).into());
    }

    let draft = Video::new_draft(user.user_id, title.to_string(), request.description);
    let video = state.videos.create_video(&draft).await?;

    tracing::info!(video_id = %video.id, "Video draft created");
    Ok((StatusCode::CREATED, Json(video)))
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    responses(
        (status = 200, description = "Caller's videos, newest first", body = Vec<Video>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "list_videos"))]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    user: UserContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let videos = state.videos.list_videos_for_user(user.user_id).await?;
    let videos = state.url_resolver.resolve_all(videos).await?;
    Ok(Json(videos))
}

#[utoipa::path(
    get,
    path = "/api/videos/{videoID}",
    tag = "videos",
    params(
        ("videoID" = uuid::Uuid, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video found", body = Video),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(user_id = %user.user_id, operation = "get_video"))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let video = load_owned_video(state.videos.as_ref(), video_id, user.user_id).await?;
    let video = state.url_resolver.resolve(video).await?;
    Ok(Json(video))
}
