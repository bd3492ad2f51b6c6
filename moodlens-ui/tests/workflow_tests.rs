//! End-to-end UI flows through `AppState` with a recording backend

mod helpers;

use helpers::{nightcall, RecordingBackend};
use moodlens_common::events::UiEvent;
use moodlens_common::{ClientConfig, SubmissionPhase};
use moodlens_ui::backend::BackendError;
use moodlens_ui::image_picker::ImageCandidate;
use moodlens_ui::submission::MISSING_SELECTION_MESSAGE;
use moodlens_ui::viewer::ImageSlot;
use moodlens_ui::{AppState, UiError};
use std::sync::Arc;

const TWO_MB: usize = 2 * 1024 * 1024;

fn app_with(backend: &Arc<RecordingBackend>) -> AppState {
    AppState::new(ClientConfig::default(), backend.clone())
}

fn cat_png() -> ImageCandidate {
    ImageCandidate::new("cat.png", "image/png", vec![0u8; TWO_MB])
}

/// Pick cat.png and select Nightcall
async fn prepare(state: &mut AppState) {
    assert!(state.image_picker.select(cat_png()));
    state.song_panel.input_and_settle("nightcall").await;
    state.song_panel.select_index(0).await;
}

#[tokio::test(start_paused = true)]
async fn cat_photo_stylized_after_nightcall() {
    // Given: cat.png (2 MB PNG) and Nightcall by Kavinsky selected
    let backend = Arc::new(RecordingBackend::new());
    let mut state = app_with(&backend);
    prepare(&mut state).await;
    assert!(state.can_submit().await);

    // When: submitting
    let mut rx = state.events.subscribe();
    state.generate().await.unwrap();

    // Then: one request carried the image and track 42
    let calls = backend.generate_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].track_id, "42");
    assert_eq!(calls[0].file_name, "cat.png");
    assert_eq!(calls[0].size_bytes, TWO_MB as u64);

    // And: the viewer shows the result with resolved URLs
    let viewer = state.viewer.as_ref().unwrap();
    assert_eq!(viewer.result().song_info.name, "Nightcall");
    assert_eq!(viewer.mood(), "mysterious");
    assert_eq!(
        viewer.image_url(ImageSlot::Stylized),
        "http://localhost:8000/uploads/stylized_42.png"
    );
    assert_eq!(
        viewer.keyword_chips(),
        vec!["Night Drive", "Synthwave", "Neon"]
    );
    assert!(viewer.render().contains("Your Stylized Image: Nightcall - Kavinsky"));

    // And: the phase walked analyzing -> generating -> idle
    let mut phases = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let UiEvent::PhaseChanged { phase, .. } = event {
            phases.push(phase);
        }
    }
    assert_eq!(
        phases,
        vec![
            SubmissionPhase::Analyzing,
            SubmissionPhase::Generating,
            SubmissionPhase::Idle
        ]
    );
    assert_eq!(state.submit_label(), "Generate Stylized Image");
    assert_eq!(state.error(), None);
}

#[tokio::test(start_paused = true)]
async fn submitting_without_song_never_calls_backend() {
    let backend = Arc::new(RecordingBackend::new());
    let mut state = app_with(&backend);
    assert!(state.image_picker.select(cat_png()));
    assert!(!state.can_submit().await);

    let err = state.generate().await.unwrap_err();

    assert!(matches!(err, UiError::Validation(_)));
    assert_eq!(err.user_message(), MISSING_SELECTION_MESSAGE);
    assert_eq!(state.error(), Some(MISSING_SELECTION_MESSAGE));
    assert!(backend.generate_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn submitting_without_image_never_calls_backend() {
    let backend = Arc::new(RecordingBackend::new());
    let mut state = app_with(&backend);
    state.song_panel.input_and_settle("nightcall").await;
    state.song_panel.select_index(0).await;

    let err = state.generate().await.unwrap_err();

    assert!(matches!(err, UiError::Validation(_)));
    assert!(backend.generate_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn backend_failure_keeps_selections_and_drops_result() {
    // Given: a successful first submission
    let backend = Arc::new(RecordingBackend::new());
    let mut state = app_with(&backend);
    prepare(&mut state).await;
    state.generate().await.unwrap();

    // When: the next one fails with a detail message
    backend.set_generate_outcome(Err(BackendError::Api {
        status: 503,
        detail: Some("Model is warming up".to_string()),
    }));
    let err = state.generate().await.unwrap_err();

    // Then: the detail is shown and the old result is gone
    assert!(matches!(err, UiError::Backend(_)));
    assert_eq!(state.error(), Some("Model is warming up"));
    assert!(state.viewer.is_none());
    assert!(state.submission.result().is_none());

    // And: the user can retry as-is
    assert!(state.image_picker.selected().is_some());
    assert_eq!(state.song_panel.selected().await, Some(nightcall()));
    assert!(state.can_submit().await);
    assert_eq!(state.submission.phase(), SubmissionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn next_success_clears_previous_error() {
    let backend = Arc::new(RecordingBackend::new());
    let mut state = app_with(&backend);
    prepare(&mut state).await;
    backend.set_generate_outcome(Err(BackendError::Network("reset by peer".to_string())));
    state.generate().await.unwrap_err();
    assert_eq!(state.error(), Some("An unexpected error occurred"));

    backend.set_generate_outcome(Ok(helpers::generate_result_for(&nightcall())));
    state.generate().await.unwrap();

    assert_eq!(state.error(), None);
    assert!(state.viewer.is_some());
}

#[tokio::test(start_paused = true)]
async fn validation_failure_keeps_previous_result() {
    let backend = Arc::new(RecordingBackend::new());
    let mut state = app_with(&backend);
    prepare(&mut state).await;
    state.generate().await.unwrap();

    state.image_picker.clear();
    state.generate().await.unwrap_err();

    assert!(state.viewer.is_some());
    assert_eq!(backend.generate_calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_image_keeps_current_selection() {
    let backend = Arc::new(RecordingBackend::new());
    let mut state = app_with(&backend);
    assert!(state.image_picker.select(cat_png()));

    let accepted = state
        .image_picker
        .select(ImageCandidate::new("anim.gif", "image/gif", vec![0u8; 128]));

    assert!(!accepted);
    assert_eq!(
        state.image_picker.notice().as_deref(),
        Some("Please select a valid image file (JPEG, PNG, or WebP)")
    );
    assert_eq!(state.image_picker.selected().unwrap().file_name(), "cat.png");
}

#[tokio::test(start_paused = true)]
async fn reset_returns_to_initial_state() {
    // Given: a completed submission
    let backend = Arc::new(RecordingBackend::new());
    let mut state = app_with(&backend);
    prepare(&mut state).await;
    state.generate().await.unwrap();
    let mut rx = state.events.subscribe();

    // When: resetting
    state.reset().await;

    // Then: everything is back to empty
    assert!(state.image_picker.selected().is_none());
    assert_eq!(state.song_panel.selected().await, None);
    assert_eq!(state.song_panel.query().await, "");
    assert!(state.viewer.is_none());
    assert!(state.submission.result().is_none());
    assert_eq!(state.error(), None);
    assert!(!state.can_submit().await);
    assert_eq!(state.submit_label(), "Generate Stylized Image");

    let mut saw_reset = false;
    while let Ok(event) = rx.try_recv() {
        saw_reset |= matches!(event, UiEvent::Reset { .. });
    }
    assert!(saw_reset);
}

#[tokio::test(start_paused = true)]
async fn reset_closes_open_dropdown() {
    // Given: results showing in an open dropdown
    let backend = Arc::new(RecordingBackend::new());
    let mut state = app_with(&backend);
    state.song_panel.input_and_settle("nightcall").await;
    state.song_panel.focus().await;
    assert!(state.song_panel.snapshot().await.dropdown_open);

    // When: resetting
    state.reset().await;

    // Then: the panel matches a fresh one
    let fresh = app_with(&Arc::new(RecordingBackend::new()));
    assert_eq!(
        state.song_panel.snapshot().await,
        fresh.song_panel.snapshot().await
    );
    assert!(!state.song_panel.snapshot().await.dropdown_open);
}
