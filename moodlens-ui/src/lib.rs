//! moodlens-ui library
//!
//! Headless UI core for the MoodLens stylization client: image picking,
//! debounced song search, submission, and result viewing. Front ends (the
//! `moodlens` binary, tests) drive it through [`AppState`].

pub mod backend;
pub mod error;
pub mod image_picker;
pub mod search;
pub mod submission;
pub mod viewer;

pub use crate::error::{UiError, UiResult};

use backend::StylizeBackend;
use image_picker::ImagePicker;
use moodlens_common::events::{EventBus, UiEvent};
use moodlens_common::ClientConfig;
use search::SongSearchPanel;
use std::sync::Arc;
use submission::SubmissionController;
use tracing::info;
use viewer::ResultViewer;

/// Event bus capacity for one UI session
pub const EVENT_CAPACITY: usize = 256;

/// Top-level UI state
///
/// Each component owns its own selection; the app state wires them
/// together and is passed explicitly to whatever renders it.
pub struct AppState {
    pub config: ClientConfig,
    pub events: EventBus,
    pub image_picker: ImagePicker,
    pub song_panel: SongSearchPanel,
    pub submission: SubmissionController,
    /// Present after a successful submission
    pub viewer: Option<ResultViewer>,
}

impl AppState {
    pub fn new(config: ClientConfig, backend: Arc<dyn StylizeBackend>) -> Self {
        let events = EventBus::new(EVENT_CAPACITY);

        Self {
            image_picker: ImagePicker::new(events.clone()),
            song_panel: SongSearchPanel::new(backend.clone(), events.clone(), &config),
            submission: SubmissionController::new(backend, events.clone()),
            viewer: None,
            events,
            config,
        }
    }

    /// Submit control enabled
    pub async fn can_submit(&self) -> bool {
        let song = self.song_panel.selected().await;
        self.submission
            .can_submit(self.image_picker.selected(), song.as_ref())
    }

    /// Submit control label for the current phase
    pub fn submit_label(&self) -> &'static str {
        self.submission.phase().label()
    }

    /// Error line for the main view
    pub fn error(&self) -> Option<&str> {
        self.submission.error()
    }

    /// Submit the current selections
    ///
    /// On success the viewer shows the new result. A backend failure drops
    /// the previous viewer; a validation failure leaves it in place.
    pub async fn generate(&mut self) -> UiResult<()> {
        let song = self.song_panel.selected().await;
        let outcome = self
            .submission
            .generate(self.image_picker.selected(), song.as_ref())
            .await;

        match outcome {
            Ok(result) => {
                self.viewer = Some(ResultViewer::new(result.clone(), &self.config));
                Ok(())
            }
            Err(e @ UiError::Validation(_)) => Err(e),
            Err(e) => {
                self.viewer = None;
                Err(e)
            }
        }
    }

    /// Back to the initial empty state
    pub async fn reset(&mut self) {
        self.image_picker.clear();
        self.song_panel.reset().await;
        self.submission.reset();
        self.viewer = None;

        info!("UI state reset");
        self.events.emit_lossy(UiEvent::Reset {
            timestamp: chrono::Utc::now(),
        });
    }
}
