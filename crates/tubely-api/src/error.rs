//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Errors from the
//! storage, processing and multipart layers convert into `HttpAppError` here so
//! every failure renders with the same status mapping, body and logging.

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use tubely_core::{AppError, ErrorMetadata, LogLevel};
use tubely_processing::{ContentTypeError, NormalizeError, ProbeError};
use tubely_storage::StorageError;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            error_type: None,
            code: code.into(),
            recoverable: false,
            suggested_action: None,
        }
    }

    fn from_app_error(error: &AppError, with_details: bool) -> Self {
        Self {
            error: error.client_message(),
            details: with_details.then(|| error.detailed_message()),
            error_type: with_details.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
///
/// Orphan rules keep us from implementing IntoResponse for AppError, which
/// lives in tubely-core.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::UploadFailed(_)
            | StorageError::DeleteFailed(_)
            | StorageError::BackendError(_) => AppError::Storage(err.to_string()),
            StorageError::IoError(e) => AppError::Internal(format!("Storage IO error: {}", e)),
            StorageError::ConfigError(msg) => {
                AppError::Internal(format!("Storage configuration error: {}", msg))
            }
        };
        HttpAppError(app)
    }
}

impl From<ProbeError> for HttpAppError {
    fn from(err: ProbeError) -> Self {
        HttpAppError(AppError::MediaProcessing(format!(
            "Couldn't determine video orientation: {}",
            err
        )))
    }
}

impl From<NormalizeError> for HttpAppError {
    fn from(err: NormalizeError) -> Self {
        HttpAppError(AppError::MediaProcessing(format!(
            "Couldn't process video for fast start: {}",
            err
        )))
    }
}

impl From<ContentTypeError> for HttpAppError {
    fn from(err: ContentTypeError) -> Self {
        HttpAppError(AppError::InvalidInput(err.to_string()))
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        let app = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(err.body_text())
        } else {
            AppError::InvalidInput(format!("Unable to parse form file: {}", err.body_text()))
        };
        HttpAppError(app)
    }
}

/// JSON body extractor that rejects with our ErrorResponse format (400 + JSON).
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details never leave the process in production or for sensitive errors.
        let with_details = !is_production_env() && !app_error.is_sensitive();
        let body = Json(ErrorResponse::from_app_error(app_error, with_details));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_app_errors() {
        let HttpAppError(app_err) = StorageError::DeleteFailed("stale".to_string()).into();
        assert!(matches!(app_err, AppError::Storage(_)));

        let HttpAppError(app_err) = StorageError::UploadFailed("boom".to_string()).into();
        match app_err {
            AppError::Storage(msg) => assert!(msg.contains("boom")),
            other => panic!("unexpected {:?}", other),
        }

        let HttpAppError(app_err) = StorageError::InvalidKey("../x".to_string()).into();
        assert!(matches!(app_err, AppError::InvalidInput(_)));

        let HttpAppError(app_err) = StorageError::ConfigError("missing".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn processing_errors_are_media_processing() {
        let HttpAppError(app_err) = ProbeError::NoVideoStream.into();
        assert!(matches!(app_err, AppError::MediaProcessing(_)));
        assert_eq!(app_err.http_status_code(), 500);

        let HttpAppError(app_err) =
            NormalizeError::MissingOutput(std::path::PathBuf::from("/tmp/x")).into();
        assert!(matches!(app_err, AppError::MediaProcessing(_)));
    }

    #[test]
    fn content_type_errors_are_bad_requests() {
        let HttpAppError(app_err) = ContentTypeError::NotAllowed {
            content_type: "image/gif".to_string(),
            allowed: vec!["image/png".to_string()],
        }
        .into();
        assert_eq!(app_err.http_status_code(), 400);
        assert_eq!(
            app_err.client_message(),
            "Invalid file type 'image/gif', allowed: image/png"
        );
    }

    #[test]
    fn sensitive_errors_hide_details() {
        let body = ErrorResponse::from_app_error(&AppError::Storage("s3 down".into()), false);
        assert_eq!(body.error, "Couldn't store uploaded file");
        assert_eq!(body.code, "STORAGE_ERROR");
        assert!(body.details.is_none());
        assert!(body.recoverable);
    }

    #[test]
    fn response_status_follows_metadata() {
        let response = HttpAppError(AppError::InvalidIdentifier("bad".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = HttpAppError(AppError::PayloadTooLarge("big".into())).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
