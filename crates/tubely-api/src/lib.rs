//! Tubely API Library
//!
//! HTTP handlers, authentication, upload ingestion and application setup.

mod api_doc;
pub mod constants;
mod handlers;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::{AppState, UploadLimits};
