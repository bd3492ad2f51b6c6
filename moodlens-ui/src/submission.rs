//! Generate request flow
//!
//! [`SubmissionController`] turns the current image and song selections
//! into one generate request and publishes either a result or a one-line
//! error message. The advisory [`SubmissionPhase`] is reset to idle on every
//! exit path by [`PhaseGuard`], including when the request future is dropped.

use crate::backend::StylizeBackend;
use crate::error::{UiError, UiResult};
use crate::image_picker::SelectedImage;
use moodlens_common::events::{EventBus, UiEvent};
use moodlens_common::{GenerateResult, SongSearchResult, SubmissionPhase};
use std::sync::Arc;
use tracing::{info, warn};

/// Validation message when either selection is missing
pub const MISSING_SELECTION_MESSAGE: &str = "Please select an image and choose a song";

/// Scoped phase tracking: entering sets a phase, dropping restores idle
struct PhaseGuard<'a> {
    phase: &'a mut SubmissionPhase,
    events: &'a EventBus,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a mut SubmissionPhase, events: &'a EventBus, first: SubmissionPhase) -> Self {
        let mut guard = Self { phase, events };
        guard.advance(first);
        guard
    }

    fn advance(&mut self, next: SubmissionPhase) {
        if *self.phase != next {
            *self.phase = next;
            self.events.emit_lossy(UiEvent::phase_changed(next));
        }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.advance(SubmissionPhase::Idle);
    }
}

/// Issues generate requests and holds the latest outcome
pub struct SubmissionController {
    backend: Arc<dyn StylizeBackend>,
    events: EventBus,
    phase: SubmissionPhase,
    result: Option<GenerateResult>,
    error: Option<String>,
}

impl SubmissionController {
    pub fn new(backend: Arc<dyn StylizeBackend>, events: EventBus) -> Self {
        Self {
            backend,
            events,
            phase: SubmissionPhase::Idle,
            result: None,
            error: None,
        }
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn result(&self) -> Option<&GenerateResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Both selections present and nothing in flight
    pub fn can_submit(&self, image: Option<&SelectedImage>, song: Option<&SongSearchResult>) -> bool {
        image.is_some() && song.is_some() && self.phase.is_idle()
    }

    /// Submit `image` and `song` to the backend
    ///
    /// A missing argument fails at once with [`UiError::Validation`] and no
    /// request. Otherwise the previous result and error are discarded and
    /// exactly one request is issued; its failure is published as the error
    /// message and returned as [`UiError::Backend`]. No retries.
    pub async fn generate(
        &mut self,
        image: Option<&SelectedImage>,
        song: Option<&SongSearchResult>,
    ) -> UiResult<&GenerateResult> {
        let (image, song) = match (image, song) {
            (Some(image), Some(song)) => (image, song),
            _ => {
                warn!(
                    has_image = image.is_some(),
                    has_song = song.is_some(),
                    "Generate requested without both selections"
                );
                self.publish_error(MISSING_SELECTION_MESSAGE.to_string());
                return Err(UiError::Validation(MISSING_SELECTION_MESSAGE.to_string()));
            }
        };

        self.error = None;
        self.result = None;

        let outcome = {
            let mut phase =
                PhaseGuard::enter(&mut self.phase, &self.events, SubmissionPhase::Analyzing);
            info!(
                file_name = %image.file_name(),
                track_id = %song.id,
                track = %song.label(),
                "Starting generation"
            );
            phase.advance(SubmissionPhase::Generating);
            self.backend.generate(image, &song.id).await
        };

        match outcome {
            Ok(result) => {
                info!(
                    track = %result.song_info.name,
                    mood = %result.song_info.analysis.mood,
                    stylized = %result.stylized_image_url,
                    "Generation succeeded"
                );
                self.events.emit_lossy(UiEvent::ResultPublished {
                    track_name: result.song_info.name.clone(),
                    stylized_image_url: result.stylized_image_url.clone(),
                    timestamp: chrono::Utc::now(),
                });
                Ok(self.result.insert(result))
            }
            Err(e) => {
                warn!(error = %e, "Generation failed");
                self.publish_error(e.user_message());
                Err(UiError::Backend(e))
            }
        }
    }

    /// Drop result, error and phase
    pub fn reset(&mut self) {
        self.result = None;
        self.error = None;
        if !self.phase.is_idle() {
            self.phase = SubmissionPhase::Idle;
            self.events
                .emit_lossy(UiEvent::phase_changed(SubmissionPhase::Idle));
        }
    }

    fn publish_error(&mut self, message: String) {
        self.events.emit_lossy(UiEvent::error_published(message.clone()));
        self.error = Some(message);
    }
}
