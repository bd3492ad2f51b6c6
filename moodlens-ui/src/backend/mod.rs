//! Stylization backend collaborator
//!
//! The backend is opaque: it searches the music catalog, analyzes the
//! selected song, and stylizes the uploaded image. UI components talk to
//! it only through [`StylizeBackend`] so tests can substitute a fake.

mod http;

pub use http::HttpBackend;

use crate::image_picker::SelectedImage;
use async_trait::async_trait;
use moodlens_common::models::HealthStatus;
use moodlens_common::{GenerateResult, SongSearchResult};
use thiserror::Error;

/// Message shown when the backend rejects a generate request without detail
pub const GENERIC_GENERATE_FAILURE: &str = "Failed to generate image";

/// Message shown when the backend could not be reached or answered garbage
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// Backend client errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Request could not be built
    #[error("Invalid request: {0}")]
    Request(String),

    /// Transport failure (connection refused, reset, DNS, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status, with the server's `detail` string if any
    #[error("API error {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Api { status: u16, detail: Option<String> },

    /// Success status but the body did not match the expected shape
    #[error("Parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// One-line message for the main view
    ///
    /// Prefers the server-supplied detail, then a generic failure for
    /// non-success statuses, then a generic unexpected-error message.
    pub fn user_message(&self) -> String {
        match self {
            BackendError::Api {
                detail: Some(detail),
                ..
            } if !detail.trim().is_empty() => detail.clone(),
            BackendError::Api { .. } => GENERIC_GENERATE_FAILURE.to_string(),
            BackendError::Request(_) | BackendError::Network(_) | BackendError::Parse(_) => {
                UNEXPECTED_ERROR.to_string()
            }
        }
    }
}

/// Operations the UI needs from the stylization backend
#[async_trait]
pub trait StylizeBackend: Send + Sync {
    /// `GET /search?query=<text>`
    async fn search(&self, query: &str) -> Result<Vec<SongSearchResult>, BackendError>;

    /// `POST /generate` with multipart fields `image` and `track_id`
    async fn generate(
        &self,
        image: &SelectedImage,
        track_id: &str,
    ) -> Result<GenerateResult, BackendError>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus, BackendError>;
}
