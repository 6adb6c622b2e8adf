use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Backends that hold binary content behind the `Storage` trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

/// Where thumbnail bytes end up.
///
/// `Inline` embeds them into the record as a `data:` URI; the other two write
/// through a storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStrategy {
    Inline,
    Local,
    S3,
}

impl StoreStrategy {
    /// Backend needed by this strategy, if any.
    pub fn backend(&self) -> Option<StorageBackend> {
        match self {
            StoreStrategy::Inline => None,
            StoreStrategy::Local => Some(StorageBackend::Local),
            StoreStrategy::S3 => Some(StorageBackend::S3),
        }
    }
}

impl FromStr for StoreStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inline" => Ok(StoreStrategy::Inline),
            "local" => Ok(StoreStrategy::Local),
            "s3" => Ok(StoreStrategy::S3),
            _ => Err(anyhow::anyhow!("Invalid store strategy: {}", s)),
        }
    }
}

impl Display for StoreStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreStrategy::Inline => write!(f, "inline"),
            StoreStrategy::Local => write!(f, "local"),
            StoreStrategy::S3 => write!(f, "s3"),
        }
    }
}

/// How a stored video is referenced from its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoUrlStyle {
    /// Public URL of the object (bucket/region URL, endpoint URL or local asset URL).
    Direct,
    /// `"{bucket},{key}"`, resolved into a presigned URL when served.
    Reference,
    /// `"{cdn_base_url}/{key}"`.
    Cdn,
}

impl FromStr for VideoUrlStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "direct" => Ok(VideoUrlStyle::Direct),
            "reference" => Ok(VideoUrlStyle::Reference),
            "cdn" => Ok(VideoUrlStyle::Cdn),
            _ => Err(anyhow::anyhow!("Invalid video URL style: {}", s)),
        }
    }
}

impl Display for VideoUrlStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            VideoUrlStyle::Direct => write!(f, "direct"),
            VideoUrlStyle::Reference => write!(f, "reference"),
            VideoUrlStyle::Cdn => write!(f, "cdn"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(" inline ".parse::<StoreStrategy>().unwrap(), StoreStrategy::Inline);
        assert_eq!("Reference".parse::<VideoUrlStyle>().unwrap(), VideoUrlStyle::Reference);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!("nfs".parse::<StorageBackend>().is_err());
        assert!("disk".parse::<StoreStrategy>().is_err());
        assert!("signed".parse::<VideoUrlStyle>().is_err());
    }

    #[test]
    fn inline_strategy_needs_no_backend() {
        assert_eq!(StoreStrategy::Inline.backend(), None);
        assert_eq!(StoreStrategy::Local.backend(), Some(StorageBackend::Local));
        assert_eq!(StoreStrategy::S3.backend(), Some(StorageBackend::S3));
    }
}
