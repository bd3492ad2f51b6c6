//! Search panel state machine

use super::SearchDebouncer;
use crate::backend::StylizeBackend;
use moodlens_common::events::{EventBus, UiEvent};
use moodlens_common::{ClientConfig, SongSearchResult};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Panel status derived from query length, request progress, and selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Query is empty
    Empty,
    /// Query is shorter than the minimum search length
    TooShort,
    /// Waiting for the debounce timer or the request for the current query
    Searching,
    /// Request for the current query returned at least one song
    Results,
    /// Request for the current query returned nothing or failed
    NoResults,
    /// A song is selected
    Selected,
}

/// Point-in-time copy of the panel for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub query: String,
    pub results: Vec<SongSearchResult>,
    pub selected: Option<SongSearchResult>,
    pub status: SearchStatus,
    pub dropdown_open: bool,
}

impl PanelSnapshot {
    /// Rows shown in the dropdown
    pub fn visible_results(&self) -> &[SongSearchResult] {
        if self.dropdown_open {
            &self.results
        } else {
            &[]
        }
    }

    /// Dropdown message when the settled search found nothing
    pub fn no_results_message(&self) -> Option<String> {
        if self.dropdown_open && self.status == SearchStatus::NoResults {
            Some(format!("No songs found for \"{}\"", self.query))
        } else {
            None
        }
    }
}

struct PanelState {
    query: String,
    results: Vec<SongSearchResult>,
    selected: Option<SongSearchResult>,
    /// A response (or failure) for the current query has been applied
    settled: bool,
    dropdown_open: bool,
    /// Bumped on every query change, selection and clear; responses tagged
    /// with an older generation are discarded
    generation: u64,
    debouncer: SearchDebouncer,
}

impl PanelState {
    fn status(&self, min_query_len: usize) -> SearchStatus {
        if self.selected.is_some() {
            return SearchStatus::Selected;
        }

        let len = self.query.chars().count();
        if len == 0 {
            SearchStatus::Empty
        } else if len < min_query_len {
            SearchStatus::TooShort
        } else if !self.settled {
            SearchStatus::Searching
        } else if self.results.is_empty() {
            SearchStatus::NoResults
        } else {
            SearchStatus::Results
        }
    }

    fn invalidate(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}

/// Debounced song search with a single selection
///
/// Cheap to clone; clones share state. The debounce timer task holds a
/// clone while it is armed.
#[derive(Clone)]
pub struct SongSearchPanel {
    state: Arc<Mutex<PanelState>>,
    backend: Arc<dyn StylizeBackend>,
    events: EventBus,
    min_query_len: usize,
}

impl SongSearchPanel {
    pub fn new(backend: Arc<dyn StylizeBackend>, events: EventBus, config: &ClientConfig) -> Self {
        let state = PanelState {
            query: String::new(),
            results: Vec::new(),
            selected: None,
            settled: false,
            dropdown_open: false,
            generation: 0,
            debouncer: SearchDebouncer::new(config.search_debounce()),
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            backend,
            events,
            min_query_len: config.min_query_len.max(1),
        }
    }

    /// Query text changed
    ///
    /// Updates the text immediately, drops the selection when the text is
    /// now empty, opens the dropdown, and re-arms the debounce timer.
    pub async fn input(&self, text: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.query = text.into();
        state.settled = false;
        state.dropdown_open = true;
        let generation = state.invalidate();

        if state.query.is_empty() && state.selected.take().is_some() {
            debug!("Query cleared, dropping selected song");
            self.events.emit_lossy(UiEvent::SongCleared {
                timestamp: chrono::Utc::now(),
            });
        }

        let panel = self.clone();
        let query = state.query.clone();
        state
            .debouncer
            .schedule(async move { panel.run_search(generation, query).await });
    }

    /// Debounce timer fired for `query`
    async fn run_search(&self, generation: u64, query: String) {
        if query.chars().count() < self.min_query_len {
            let mut state = self.state.lock().await;
            if state.generation == generation {
                state.results.clear();
                state.settled = true;
            }
            return;
        }

        debug!(query = %query, generation, "Issuing search request");
        let results = match self.backend.search(&query).await {
            Ok(results) => results,
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed, showing no results");
                Vec::new()
            }
        };

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(
                query = %query,
                generation,
                current = state.generation,
                "Discarding stale search response"
            );
            return;
        }

        let result_count = results.len();
        state.results = results;
        state.settled = true;
        drop(state);

        self.events.emit_lossy(UiEvent::SearchSettled {
            query,
            result_count,
            timestamp: chrono::Utc::now(),
        });
    }

    /// Promote a result to the selected song
    ///
    /// The query text becomes `"<name> - <artist>"` and the dropdown closes.
    pub async fn select(&self, song: SongSearchResult) {
        let mut state = self.state.lock().await;
        state.debouncer.cancel();
        state.invalidate();
        state.query = song.label();
        state.dropdown_open = false;
        state.settled = true;

        self.events.emit_lossy(UiEvent::SongSelected {
            track_id: song.id.clone(),
            label: state.query.clone(),
            timestamp: chrono::Utc::now(),
        });
        state.selected = Some(song);
    }

    /// Select the result at `index` in the current list
    pub async fn select_index(&self, index: usize) -> Option<SongSearchResult> {
        let song = self.state.lock().await.results.get(index).cloned()?;
        self.select(song.clone()).await;
        Some(song)
    }

    /// Clear-selection control: drops the song, the query text and the results
    pub async fn clear_selection(&self) {
        let mut state = self.state.lock().await;
        state.debouncer.cancel();
        state.invalidate();
        state.query.clear();
        state.results.clear();
        state.settled = false;

        if state.selected.take().is_some() {
            self.events.emit_lossy(UiEvent::SongCleared {
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Back to the freshly constructed state: no query, results, selection,
    /// pending search, and a closed dropdown
    pub async fn reset(&self) {
        self.clear_selection().await;
        self.state.lock().await.dropdown_open = false;
    }

    /// Pointer went down outside the panel: close the dropdown only
    pub async fn click_outside(&self) {
        self.state.lock().await.dropdown_open = false;
    }

    /// Input regained focus: reopen the dropdown
    pub async fn focus(&self) {
        self.state.lock().await.dropdown_open = true;
    }

    pub async fn selected(&self) -> Option<SongSearchResult> {
        self.state.lock().await.selected.clone()
    }

    pub async fn query(&self) -> String {
        self.state.lock().await.query.clone()
    }

    pub async fn status(&self) -> SearchStatus {
        self.state.lock().await.status(self.min_query_len)
    }

    pub async fn snapshot(&self) -> PanelSnapshot {
        let state = self.state.lock().await;
        PanelSnapshot {
            query: state.query.clone(),
            results: state.results.clone(),
            selected: state.selected.clone(),
            status: state.status(self.min_query_len),
            dropdown_open: state.dropdown_open,
        }
    }

    /// Type `text` and wait until its search has settled
    ///
    /// Queries below the minimum length return at once. Used by line-based
    /// front ends where each line is a complete edit.
    pub async fn input_and_settle(&self, text: impl Into<String>) -> PanelSnapshot {
        let text = text.into();
        let mut rx = self.events.subscribe();
        let searchable = text.chars().count() >= self.min_query_len;

        self.input(text.clone()).await;
        if !searchable {
            return self.snapshot().await;
        }

        loop {
            match rx.recv().await {
                Ok(UiEvent::SearchSettled { query, .. }) if query == text => break,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Event receiver lagged while waiting for search");
                    if self.status().await != SearchStatus::Searching {
                        break;
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }

        self.snapshot().await
    }
}
