//! Test Helper Utilities
//!
//! Shared utilities for testing moodlens-ui

#![allow(dead_code)]

pub mod fake_server;
pub mod recording_backend;

pub use fake_server::{spawn_fake_server, FakeServerState};
pub use recording_backend::{GenerateCall, RecordingBackend};

use moodlens_common::events::EventBus;
use moodlens_common::{GenerateResult, SongAnalysis, SongInfo, SongSearchResult};
use moodlens_ui::image_picker::{ImageCandidate, ImagePicker, SelectedImage};

pub fn song(id: &str, name: &str, artist: &str, album: &str) -> SongSearchResult {
    SongSearchResult {
        id: id.to_string(),
        name: name.to_string(),
        artist: artist.to_string(),
        album: album.to_string(),
        image_url: None,
    }
}

pub fn nightcall() -> SongSearchResult {
    song("42", "Nightcall", "Kavinsky", "OutRun")
}

pub fn generate_result_for(song: &SongSearchResult) -> GenerateResult {
    GenerateResult {
        original_image_url: format!("/uploads/original_{}.png", song.id),
        stylized_image_url: format!("/uploads/stylized_{}.png", song.id),
        song_info: SongInfo {
            name: song.name.clone(),
            artist: song.artist.clone(),
            analysis: SongAnalysis {
                mood: "mysterious".to_string(),
                keywords: vec![
                    "night drive".to_string(),
                    "synthwave".to_string(),
                    "neon".to_string(),
                ],
                description: "A brooding late-night cruise through the city".to_string(),
            },
        },
    }
}

/// An accepted image, built through the picker
pub fn selected_image(file_name: &str, media_type: &str, bytes: Vec<u8>) -> SelectedImage {
    let mut picker = ImagePicker::new(EventBus::new(16));
    assert!(
        picker.select(ImageCandidate::new(file_name, media_type, bytes)),
        "test image should be accepted"
    );
    picker.selected().cloned().unwrap()
}
