//! Content type parsing and allow-list validation for uploaded parts

use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;

pub const VIDEO_MP4: &str = "video/mp4";
pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_JPEG: &str = "image/jpeg";

/// Content types accepted for thumbnails written to a store.
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &[IMAGE_PNG, IMAGE_JPEG];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentTypeError {
    #[error("Missing Content-Type for file")]
    Missing,

    #[error("Invalid Content-Type: {0}")]
    Malformed(String),

    #[error("Invalid file type '{content_type}', allowed: {}", allowed.join(", "))]
    NotAllowed {
        content_type: String,
        allowed: Vec<String>,
    },
}

/// A parsed MIME type: `type/subtype`, parameters stripped, lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeDescriptor {
    essence: String,
    slash: usize,
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric()
                || matches!(
                    c,
                    '!' | '#' | '$' | '&' | '-' | '^' | '_' | '.' | '+' | '\'' | '*' | '%' | '`'
                        | '|' | '~'
                )
        })
}

impl ContentTypeDescriptor {
    /// Parse a Content-Type header value (e.g. "image/jpeg; charset=utf-8").
    pub fn parse(raw: &str) -> Result<Self, ContentTypeError> {
        let essence = raw.split(';').next().unwrap_or(raw).trim().to_lowercase();
        if essence.is_empty() {
            return Err(ContentTypeError::Missing);
        }

        let (top, sub) = essence
            .split_once('/')
            .ok_or_else(|| ContentTypeError::Malformed(raw.to_string()))?;
        if !is_token(top) || !is_token(sub) {
            return Err(ContentTypeError::Malformed(raw.to_string()));
        }

        let slash = top.len();
        Ok(ContentTypeDescriptor { essence, slash })
    }

    /// Parse an optional header value; absence is `ContentTypeError::Missing`.
    pub fn parse_optional(raw: Option<&str>) -> Result<Self, ContentTypeError> {
        match raw {
            Some(raw) => Self::parse(raw),
            None => Err(ContentTypeError::Missing),
        }
    }

    /// `type/subtype`.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn subtype(&self) -> &str {
        &self.essence[self.slash + 1..]
    }

    /// File extension for this type: the subtype (`image/jpeg` -> `jpeg`).
    pub fn extension(&self) -> &str {
        self.subtype()
    }

    pub fn is(&self, essence: &str) -> bool {
        self.essence.eq_ignore_ascii_case(essence)
    }

    pub fn ensure_allowed(&self, allowed: &[&str]) -> Result<(), ContentTypeError> {
        if allowed.iter().any(|a| self.is(a)) {
            return Ok(());
        }
        Err(ContentTypeError::NotAllowed {
            content_type: self.essence.clone(),
            allowed: allowed.iter().map(|a| a.to_string()).collect(),
        })
    }
}

impl Display for ContentTypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.essence)
    }
}
