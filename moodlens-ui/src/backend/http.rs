//! reqwest-based backend client

use super::{BackendError, StylizeBackend};
use crate::image_picker::SelectedImage;
use async_trait::async_trait;
use moodlens_common::models::HealthStatus;
use moodlens_common::{ClientConfig, GenerateResult, SongSearchResult};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("MoodLens/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the stylization backend
///
/// No request timeout is configured: generation can legitimately take a
/// long time and the UI offers no cancellation.
#[derive(Clone)]
pub struct HttpBackend {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Download an image returned in a generate result
    ///
    /// `url` may be relative to the backend; it is resolved first.
    pub async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        let url = self.config.resolve_url(url);
        debug!(url = %url, "Fetching image");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Build an [`BackendError::Api`] from a non-success response
///
/// The body is read as JSON and its `detail` field kept only if it is a
/// string (validation errors carry a list there instead).
async fn api_error(response: reqwest::Response) -> BackendError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("detail")
                .and_then(|detail| detail.as_str())
                .map(str::to_string)
        });

    BackendError::Api { status, detail }
}

#[async_trait]
impl StylizeBackend for HttpBackend {
    async fn search(&self, query: &str) -> Result<Vec<SongSearchResult>, BackendError> {
        let url = self.config.endpoint("/search");
        debug!(query = %query, "Searching songs");

        let response = self
            .http_client
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let results: Vec<SongSearchResult> = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        debug!(query = %query, count = results.len(), "Search returned");
        Ok(results)
    }

    async fn generate(
        &self,
        image: &SelectedImage,
        track_id: &str,
    ) -> Result<GenerateResult, BackendError> {
        let url = self.config.endpoint("/generate");

        let image_part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.media_type().as_mime())
            .map_err(|e| BackendError::Request(e.to_string()))?;
        let form = Form::new()
            .part("image", image_part)
            .text("track_id", track_id.to_string());

        info!(
            file_name = %image.file_name(),
            size_bytes = image.size_bytes(),
            track_id = %track_id,
            "Submitting generate request"
        );

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let err = api_error(response).await;
            warn!(error = %err, "Generate request rejected");
            return Err(err);
        }

        response
            .json::<GenerateResult>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn health(&self) -> Result<HealthStatus, BackendError> {
        let url = self.config.endpoint("/health");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        response
            .json::<HealthStatus>()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}
