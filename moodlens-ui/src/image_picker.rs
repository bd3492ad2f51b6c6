//! Image selection and validation
//!
//! Holds at most one user-chosen image. Candidates are validated against a
//! media-type allow-list and a 10 MiB size cap before they replace the
//! current selection. Rejections never propagate as errors: the picker
//! keeps its previous selection, logs the rejection, and exposes a notice
//! for the user.

use base64::Engine;
use moodlens_common::events::{EventBus, UiEvent};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Largest accepted image, inclusive (10 MiB)
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Media types accepted by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMediaType {
    Jpeg,
    /// Non-standard `image/jpg` alias some platforms report
    Jpg,
    Png,
    Webp,
}

impl ImageMediaType {
    pub const ALLOWED: [ImageMediaType; 4] = [
        ImageMediaType::Jpeg,
        ImageMediaType::Jpg,
        ImageMediaType::Png,
        ImageMediaType::Webp,
    ];

    /// Match a declared MIME type against the allow-list, exactly
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALLOWED.into_iter().find(|t| t.as_mime() == mime)
    }

    /// Map a file extension (without dot) to its declared MIME type
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageMediaType::Jpeg),
            "png" => Some(ImageMediaType::Png),
            "webp" => Some(ImageMediaType::Webp),
            _ => None,
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            ImageMediaType::Jpeg => "image/jpeg",
            ImageMediaType::Jpg => "image/jpg",
            ImageMediaType::Png => "image/png",
            ImageMediaType::Webp => "image/webp",
        }
    }
}

/// Why a candidate was refused; `Display` is the user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PickerRejection {
    #[error("Please select a valid image file (JPEG, PNG, or WebP)")]
    UnsupportedType,

    #[error("File size must be less than 10MB")]
    TooLarge,
}

/// A file offered to the picker, not yet validated
#[derive(Debug, Clone)]
pub struct ImageCandidate {
    pub file_name: String,
    /// MIME type as declared by the source
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl ImageCandidate {
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a candidate from disk
    ///
    /// The declared media type comes from the content signature when it is
    /// recognizable, otherwise from the file extension.
    pub async fn from_path(path: &Path) -> moodlens_common::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = declared_media_type(path, &bytes);

        Ok(Self {
            file_name,
            media_type,
            bytes,
        })
    }
}

fn declared_media_type(path: &Path, bytes: &[u8]) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }

    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageMediaType::from_extension)
        .map(|t| t.as_mime().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Check a candidate against the type allow-list, then the size cap
pub fn validate(candidate: &ImageCandidate) -> Result<ImageMediaType, PickerRejection> {
    let media_type =
        ImageMediaType::from_mime(&candidate.media_type).ok_or(PickerRejection::UnsupportedType)?;

    if candidate.bytes.len() as u64 > MAX_IMAGE_BYTES {
        return Err(PickerRejection::TooLarge);
    }

    Ok(media_type)
}

/// An accepted image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    file_name: String,
    media_type: ImageMediaType,
    bytes: Vec<u8>,
}

impl SelectedImage {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn media_type(&self) -> ImageMediaType {
        self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Size in MiB with two decimals, e.g. `"2.00 MB"`
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_bytes() as f64 / 1024.0 / 1024.0)
    }

    /// `data:` URL for local preview rendering; never sent to the backend
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type.as_mime(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Owner of the single image selection
pub struct ImagePicker {
    selected: Option<SelectedImage>,
    rejection: Option<PickerRejection>,
    events: EventBus,
}

impl ImagePicker {
    pub fn new(events: EventBus) -> Self {
        Self {
            selected: None,
            rejection: None,
            events,
        }
    }

    /// Offer a candidate; returns whether it was accepted
    ///
    /// On rejection the current selection is kept and [`notice`](Self::notice)
    /// reports which rule failed.
    pub fn select(&mut self, candidate: ImageCandidate) -> bool {
        match validate(&candidate) {
            Ok(media_type) => {
                let size_bytes = candidate.bytes.len() as u64;
                info!(
                    file_name = %candidate.file_name,
                    size_bytes,
                    media_type = media_type.as_mime(),
                    "Image selected"
                );
                self.events.emit_lossy(UiEvent::ImageAccepted {
                    file_name: candidate.file_name.clone(),
                    size_bytes,
                    timestamp: chrono::Utc::now(),
                });
                self.selected = Some(SelectedImage {
                    file_name: candidate.file_name,
                    media_type,
                    bytes: candidate.bytes,
                });
                self.rejection = None;
                true
            }
            Err(rejection) => {
                warn!(
                    file_name = %candidate.file_name,
                    media_type = %candidate.media_type,
                    size_bytes = candidate.bytes.len(),
                    reason = %rejection,
                    "Image rejected"
                );
                self.events.emit_lossy(UiEvent::ImageRejected {
                    file_name: candidate.file_name,
                    reason: rejection.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                self.rejection = Some(rejection);
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.rejection = None;
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn last_rejection(&self) -> Option<PickerRejection> {
        self.rejection
    }

    /// User-facing message for the most recent rejection
    pub fn notice(&self) -> Option<String> {
        self.rejection.map(|r| r.to_string())
    }
}
