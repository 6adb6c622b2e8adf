use axum::{http::StatusCode, response::IntoResponse, Json};

/// Liveness probe - process is running.
#[utoipa::path(
    get,
    path = "/api/healthz",
    tag = "health",
    responses((status = 200, description = "Process is alive"))
)]
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}
