use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub iss: String,
    pub sub: String, // user_id
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated user, stored in request extensions by `auth_middleware`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: Uuid,
}

// Extracted from parts so it can sit in front of a Multipart extractor.
impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserContext>()
            .copied()
            .ok_or_else(|| {
                let mut body = ErrorResponse::new("Couldn't validate JWT", "UNAUTHORIZED");
                body.suggested_action = Some("Check the bearer token".to_string());
                (StatusCode::UNAUTHORIZED, Json(body))
            })
    }
}
