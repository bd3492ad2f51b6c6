//! Error types for moodlens-ui
//!
//! Two tiers: validation failures caught before any network call, and
//! backend failures from the request itself. Neither is fatal; both leave
//! the current selections intact for a retry.

use crate::backend::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UiError {
    /// Missing selection or otherwise unusable input; no request was made
    #[error("{0}")]
    Validation(String),

    /// Request reached (or tried to reach) the backend and failed
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// moodlens-common error (configuration, I/O)
    #[error("Common error: {0}")]
    Common(#[from] moodlens_common::Error),
}

impl UiError {
    /// Message for the main view
    pub fn user_message(&self) -> String {
        match self {
            UiError::Validation(message) => message.clone(),
            UiError::Backend(e) => e.user_message(),
            UiError::Common(e) => e.to_string(),
        }
    }
}

/// Result type for UI operations
pub type UiResult<T> = Result<T, UiError>;
