//! HS256 access tokens
//!
//! Tokens carry the user id as `sub` and are issued by `tubely-access`.

use crate::auth::models::JwtClaims;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use tubely_core::AppError;
use uuid::Uuid;

pub const TOKEN_ISSUER: &str = "tubely-access";

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn get_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header format".to_string())
        })?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized(
            "Missing bearer token".to_string(),
        ));
    }
    Ok(token)
}

/// Signs and validates access tokens with a shared secret
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl JwtService {
    pub fn new(secret: &str, expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: Duration::hours(expiry_hours),
        }
    }

    /// Issue a token for `user_id` that expires after the configured lifetime.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        self.issue_with_expiry(user_id, self.expiry)
    }

    pub fn issue_with_expiry(&self, user_id: Uuid, expires_in: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate signature, issuer and expiry, and return the user id.
    pub fn validate(&self, token: &str) -> Result<Uuid, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = true;
        validation.leeway = 0;

        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                ErrorKind::InvalidIssuer => AppError::Unauthorized("Invalid issuer".to_string()),
                _ => AppError::Unauthorized(format!("Couldn't validate JWT: {}", e)),
            }
        })?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))
    }
}
