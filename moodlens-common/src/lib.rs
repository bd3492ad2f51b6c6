//! # MoodLens Common Library
//!
//! Shared code for the MoodLens client crates including:
//! - Backend data model (search results, song analysis, generate results)
//! - Client configuration loading
//! - UI event types and the EventBus
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod models;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use models::{GenerateResult, SongAnalysis, SongInfo, SongSearchResult, SubmissionPhase};
