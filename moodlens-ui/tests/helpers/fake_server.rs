//! Fake stylization backend on a loopback port
//!
//! Behaviour is keyed on the request:
//! - `/search?query=boom` answers 500, `query=garbled` answers invalid JSON,
//!   anything else returns Nightcall plus one song named after the query
//! - `/generate` with `track_id` `busy` (503 + detail), `crash` (500, plain
//!   text), `invalid` (422, list detail), `garbled` (200, not JSON);
//!   anything else succeeds
//! - `/uploads/<name>` returns the name's bytes as a PNG body

use super::{generate_result_for, nightcall, song};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// What the fake saw in one `/generate` request
#[derive(Debug, Clone, Default)]
pub struct ReceivedGenerate {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub image_len: usize,
    pub track_id: Option<String>,
}

#[derive(Clone, Default)]
pub struct FakeServerState {
    pub search_queries: Arc<Mutex<Vec<String>>>,
    pub generates: Arc<Mutex<Vec<ReceivedGenerate>>>,
}

impl FakeServerState {
    pub fn search_queries(&self) -> Vec<String> {
        self.search_queries.lock().unwrap().clone()
    }

    pub fn generates(&self) -> Vec<ReceivedGenerate> {
        self.generates.lock().unwrap().clone()
    }
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

async fn search(State(state): State<FakeServerState>, Query(params): Query<SearchParams>) -> Response {
    state.search_queries.lock().unwrap().push(params.query.clone());

    match params.query.as_str() {
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
        "garbled" => (StatusCode::OK, "<html>not json</html>").into_response(),
        query => Json(vec![
            nightcall(),
            song("7", query, "Query Echo", "Loopback"),
        ])
        .into_response(),
    }
}

async fn generate(State(state): State<FakeServerState>, mut multipart: Multipart) -> Response {
    let mut received = ReceivedGenerate::default();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                received.file_name = field.file_name().map(str::to_string);
                received.content_type = field.content_type().map(str::to_string);
                received.image_len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            }
            Some("track_id") => {
                received.track_id = field.text().await.ok();
            }
            _ => {}
        }
    }

    let track_id = received.track_id.clone().unwrap_or_default();
    state.generates.lock().unwrap().push(received);

    match track_id.as_str() {
        "busy" => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "detail": "Image generation service is busy, try again later" })),
        )
            .into_response(),
        "crash" => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
        "invalid" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": [{ "loc": ["body", "track_id"], "msg": "field required" }]
            })),
        )
            .into_response(),
        "garbled" => (StatusCode::OK, "{\"original_image_url\":").into_response(),
        _ => Json(generate_result_for(&nightcall())).into_response(),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "message": "fake backend" }))
}

async fn upload(Path(name): Path<String>) -> Response {
    ([(header::CONTENT_TYPE, "image/png")], name.into_bytes()).into_response()
}

/// Serve the fake on `127.0.0.1:0`; returns its base URL
pub async fn spawn_fake_server() -> (String, FakeServerState) {
    let state = FakeServerState::default();
    let app = Router::new()
        .route("/search", get(search))
        .route("/generate", post(generate))
        .route("/health", get(health))
        .route("/uploads/:name", get(upload))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), state)
}
