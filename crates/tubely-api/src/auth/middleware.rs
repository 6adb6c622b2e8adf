use crate::auth::jwt::get_bearer_token;
use crate::auth::models::UserContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Require a valid bearer token and attach the caller's `UserContext`.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = match get_bearer_token(request.headers()).and_then(|t| state.jwt.validate(t)) {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(error = %e, path = %request.uri().path(), "Authentication failed");
            return HttpAppError(e).into_response();
        }
    };

    request.extensions_mut().insert(UserContext { user_id });
    next.run(request).await
}
