//! Song search autocomplete
//!
//! [`SongSearchPanel`] owns the query text, the result list, and the
//! selected song; [`SearchDebouncer`] keeps request volume bounded while the
//! user is typing.

mod debouncer;
mod panel;

pub use debouncer::SearchDebouncer;
pub use panel::{PanelSnapshot, SearchStatus, SongSearchPanel};
