//! Result presentation
//!
//! Renders a [`GenerateResult`]: the original and stylized images (URLs
//! resolved against the backend), the mood tag, the description, and the
//! keyword chips. The only state is which image, if any, is shown full
//! size in the overlay.

use moodlens_common::{ClientConfig, GenerateResult};
use std::fmt::Write;
use tracing::debug;

/// Which of the two result images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Original,
    Stylized,
}

impl ImageSlot {
    pub fn title(&self) -> &'static str {
        match self {
            ImageSlot::Original => "Original",
            ImageSlot::Stylized => "Stylized",
        }
    }
}

/// Capitalize the first letter of each space-separated word
///
/// Display only; the rest of each word is left as is.
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct ResultViewer {
    result: GenerateResult,
    original_url: String,
    stylized_url: String,
    overlay: Option<String>,
}

impl ResultViewer {
    pub fn new(result: GenerateResult, config: &ClientConfig) -> Self {
        let original_url = config.resolve_url(&result.original_image_url);
        let stylized_url = config.resolve_url(&result.stylized_image_url);

        Self {
            result,
            original_url,
            stylized_url,
            overlay: None,
        }
    }

    /// The result exactly as received
    pub fn result(&self) -> &GenerateResult {
        &self.result
    }

    pub fn image_url(&self, slot: ImageSlot) -> &str {
        match slot {
            ImageSlot::Original => &self.original_url,
            ImageSlot::Stylized => &self.stylized_url,
        }
    }

    pub fn mood(&self) -> &str {
        &self.result.song_info.analysis.mood
    }

    pub fn description(&self) -> &str {
        &self.result.song_info.analysis.description
    }

    /// Keywords as displayed
    pub fn keyword_chips(&self) -> Vec<String> {
        self.result
            .song_info
            .analysis
            .keywords
            .iter()
            .map(|keyword| capitalize_words(keyword))
            .collect()
    }

    /// Show `url` full size; opening the same URL again changes nothing
    pub fn open_overlay(&mut self, url: impl Into<String>) {
        let url = url.into();
        if self.overlay.as_deref() != Some(url.as_str()) {
            debug!(url = %url, "Opening full-size overlay");
            self.overlay = Some(url);
        }
    }

    pub fn open_slot(&mut self, slot: ImageSlot) {
        let url = self.image_url(slot).to_string();
        self.open_overlay(url);
    }

    /// Backdrop click and close control both land here
    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn overlay(&self) -> Option<&str> {
        self.overlay.as_deref()
    }

    /// Plain-text rendering for terminal front ends
    pub fn render(&self) -> String {
        let info = &self.result.song_info;
        let mut out = String::new();

        let _ = writeln!(out, "Your Stylized Image: {} - {}", info.name, info.artist);
        for slot in [ImageSlot::Original, ImageSlot::Stylized] {
            let _ = writeln!(out, "  {:<9} {}", format!("{}:", slot.title()), self.image_url(slot));
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "AI Song Analysis");
        let _ = writeln!(out, "  Mood: {}", self.mood().to_uppercase());
        let _ = writeln!(out, "  Description: {}", self.description());
        let _ = writeln!(out, "  Keywords: {}", self.keyword_chips().join(" | "));
        if let Some(url) = self.overlay() {
            let _ = writeln!(out);
            let _ = writeln!(out, "[full size] {}", url);
        }

        out
    }
}
