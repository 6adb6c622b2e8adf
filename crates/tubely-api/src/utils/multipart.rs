//! Request helpers shared by the upload handlers

use crate::error::HttpAppError;
use axum::extract::multipart::Field;
use axum::http::{header::CONTENT_LENGTH, HeaderMap};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tubely_core::AppError;
use uuid::Uuid;

/// Parse the `{videoID}` path segment.
pub fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidIdentifier(format!("Invalid ID: {}", raw)))
}

/// Reject a request whose declared `Content-Length` exceeds `limit` before any
/// of the body is read.
pub fn ensure_content_length(headers: &HeaderMap, limit: usize) -> Result<(), AppError> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    match declared {
        Some(len) if len > limit as u64 => Err(AppError::PayloadTooLarge(format!(
            "Request body of {} bytes exceeds the {} byte limit",
            len, limit
        ))),
        _ => Ok(()),
    }
}

/// Copy a multipart field chunk by chunk into `writer`. Returns the byte count.
pub async fn spool_field<W>(field: &mut Field<'_>, writer: &mut W) -> Result<u64, HttpAppError>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0u64;
    while let Some(chunk) = field.chunk().await? {
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Couldn't write upload to disk: {}", e)))?;
        written += chunk.len() as u64;
    }
    writer
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("Couldn't write upload to disk: {}", e)))?;
    Ok(written)
}
