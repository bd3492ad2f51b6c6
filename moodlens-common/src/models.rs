//! Backend data model
//!
//! Wire types exchanged with the stylization backend, plus the advisory
//! submission phase shared by the UI crates.

use serde::{Deserialize, Serialize};

/// One entry of the `GET /search` response array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SongSearchResult {
    /// Catalog-unique track identifier
    pub id: String,
    /// Track title
    pub name: String,
    /// Primary artist name
    pub artist: String,
    /// Album title
    pub album: String,
    /// Album cover URL (absent when the catalog has no artwork)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl SongSearchResult {
    /// Query text shown once this song is selected: `"<name> - <artist>"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.name, self.artist)
    }

    /// Secondary line of a result row: `"<artist> • <album>"`
    pub fn subtitle(&self) -> String {
        format!("{} • {}", self.artist, self.album)
    }
}

/// Mood analysis of a song, produced by the backend
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SongAnalysis {
    pub mood: String,
    pub keywords: Vec<String>,
    pub description: String,
}

/// Song details echoed back with a generate result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SongInfo {
    pub name: String,
    pub artist: String,
    pub analysis: SongAnalysis,
}

/// `POST /generate` success response
///
/// Image URLs are usually paths relative to the backend base URL
/// (e.g. `/uploads/stylized_<uuid>.png`); see
/// [`ClientConfig::resolve_url`](crate::config::ClientConfig::resolve_url).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenerateResult {
    pub original_image_url: String,
    pub stylized_image_url: String,
    pub song_info: SongInfo,
}

/// `GET /health` response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Coarse progress label for a submission
///
/// Advisory only: drives button labels, never gates correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Analyzing,
    Generating,
}

impl SubmissionPhase {
    /// Submit control label for this phase
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionPhase::Idle => "Generate Stylized Image",
            SubmissionPhase::Analyzing => "Analyzing song...",
            SubmissionPhase::Generating => "Generating image...",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SubmissionPhase::Idle)
    }
}

impl std::fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SubmissionPhase::Idle => "idle",
            SubmissionPhase::Analyzing => "analyzing",
            SubmissionPhase::Generating => "generating",
        };
        f.write_str(name)
    }
}
