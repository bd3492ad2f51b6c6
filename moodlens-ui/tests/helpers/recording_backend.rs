//! In-process backend double
//!
//! Records every call and answers from a script. Delays use tokio time so
//! tests can run with a paused clock.

use super::{generate_result_for, nightcall};
use async_trait::async_trait;
use moodlens_common::models::HealthStatus;
use moodlens_common::{GenerateResult, SongSearchResult};
use moodlens_ui::backend::{BackendError, StylizeBackend};
use moodlens_ui::image_picker::SelectedImage;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// One recorded `generate` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateCall {
    pub track_id: String,
    pub file_name: String,
    pub size_bytes: u64,
}

struct ScriptedSearch {
    delay: Duration,
    outcome: Result<Vec<SongSearchResult>, BackendError>,
}

pub struct RecordingBackend {
    searches: Mutex<Vec<String>>,
    generates: Mutex<Vec<GenerateCall>>,
    search_script: Mutex<HashMap<String, ScriptedSearch>>,
    default_results: Vec<SongSearchResult>,
    generate_outcome: Mutex<Option<Result<GenerateResult, BackendError>>>,
}

impl RecordingBackend {
    /// Unscripted searches answer `[Nightcall]` immediately; unscripted
    /// generates succeed for the requested track id.
    pub fn new() -> Self {
        Self {
            searches: Mutex::new(Vec::new()),
            generates: Mutex::new(Vec::new()),
            search_script: Mutex::new(HashMap::new()),
            default_results: vec![nightcall()],
            generate_outcome: Mutex::new(None),
        }
    }

    pub fn script_search(
        &self,
        query: &str,
        delay: Duration,
        outcome: Result<Vec<SongSearchResult>, BackendError>,
    ) {
        self.search_script
            .lock()
            .unwrap()
            .insert(query.to_string(), ScriptedSearch { delay, outcome });
    }

    pub fn set_generate_outcome(&self, outcome: Result<GenerateResult, BackendError>) {
        *self.generate_outcome.lock().unwrap() = Some(outcome);
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }

    pub fn generate_calls(&self) -> Vec<GenerateCall> {
        self.generates.lock().unwrap().clone()
    }
}

#[async_trait]
impl StylizeBackend for RecordingBackend {
    async fn search(&self, query: &str) -> Result<Vec<SongSearchResult>, BackendError> {
        self.searches.lock().unwrap().push(query.to_string());

        let scripted = self
            .search_script
            .lock()
            .unwrap()
            .get(query)
            .map(|s| (s.delay, s.outcome.clone()));

        match scripted {
            Some((delay, outcome)) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            None => Ok(self.default_results.clone()),
        }
    }

    async fn generate(
        &self,
        image: &SelectedImage,
        track_id: &str,
    ) -> Result<GenerateResult, BackendError> {
        self.generates.lock().unwrap().push(GenerateCall {
            track_id: track_id.to_string(),
            file_name: image.file_name().to_string(),
            size_bytes: image.size_bytes(),
        });

        let scripted = self.generate_outcome.lock().unwrap().clone();
        match scripted {
            Some(outcome) => outcome,
            None => {
                let song = self
                    .default_results
                    .iter()
                    .find(|s| s.id == track_id)
                    .cloned()
                    .unwrap_or_else(nightcall);
                Ok(generate_result_for(&song))
            }
        }
    }

    async fn health(&self) -> Result<HealthStatus, BackendError> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
            message: "recording backend".to_string(),
        })
    }
}
