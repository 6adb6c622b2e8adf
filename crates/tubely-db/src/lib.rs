//! Tubely Database Library
//!
//! Repositories over the Postgres metadata store.

pub mod db;

pub use db::{PgVideoRepository, VideoRepository};
