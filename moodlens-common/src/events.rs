//! UI event types for the MoodLens event system
//!
//! Components publish state changes on the [`EventBus`]; front ends
//! subscribe to render progress labels and notices without polling.

use crate::models::SubmissionPhase;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// MoodLens UI event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    /// Submission phase changed (drives the submit control label)
    PhaseChanged {
        phase: SubmissionPhase,
        timestamp: DateTime<Utc>,
    },

    /// A search response (or failure) was applied to the panel
    SearchSettled {
        /// Query the results belong to
        query: String,
        /// Zero on failure as well as on an empty response
        result_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A search result was promoted to the selected song
    SongSelected {
        track_id: String,
        label: String,
        timestamp: DateTime<Utc>,
    },

    /// Song selection was cleared
    SongCleared { timestamp: DateTime<Utc> },

    /// An image passed validation and replaced the previous selection
    ImageAccepted {
        file_name: String,
        size_bytes: u64,
        timestamp: DateTime<Utc>,
    },

    /// An image failed validation; the previous selection is unchanged
    ImageRejected {
        file_name: String,
        /// User-facing notice
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// A generate request succeeded
    ResultPublished {
        track_name: String,
        stylized_image_url: String,
        timestamp: DateTime<Utc>,
    },

    /// A submission failed; `message` is shown in the main view
    ErrorPublished {
        message: String,
        timestamp: DateTime<Utc>,
    },

    /// All selections, results and errors were discarded
    Reset { timestamp: DateTime<Utc> },
}

impl UiEvent {
    pub fn phase_changed(phase: SubmissionPhase) -> Self {
        UiEvent::PhaseChanged {
            phase,
            timestamp: Utc::now(),
        }
    }

    pub fn error_published(message: impl Into<String>) -> Self {
        UiEvent::ErrorPublished {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast bus for [`UiEvent`]s
///
/// Cloning is cheap; all clones share one channel. Events emitted before a
/// receiver subscribes are not delivered to it.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering at most `capacity` events per
    /// lagging receiver
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: UiEvent) -> Result<usize, broadcast::error::SendError<UiEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
