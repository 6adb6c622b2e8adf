//! Tubely Storage Library
//!
//! This crate provides the storage abstraction and its implementations for
//! Tubely: the `Storage` trait, an S3 backend built on `object_store` and a
//! local filesystem backend.
//!
//! # Storage key format
//!
//! Video keys are `{orientation}/{random}.mp4` (or `{random}.mp4` when
//! partitioning is off), where `random` is 32 CSPRNG bytes in unpadded
//! URL-safe base64. Thumbnail keys are `{video_id}.{ext}`. Keys must not
//! contain `..` or a leading `/`. Key generation lives in the `keys` module so
//! all callers stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, create_storage_for};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
