//! Database repositories for data access layer
//!
//! Each repository is responsible for a specific domain entity. Repositories
//! are exposed as traits so the HTTP layer can be exercised without a database.

pub mod video;

pub use video::{PgVideoRepository, VideoRepository};
