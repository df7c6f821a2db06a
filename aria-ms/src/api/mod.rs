//! HTTP API for the Aria media server
//!
//! Routes:
//! - `GET /health`: service health probe
//! - `GET /api/music`: shuffled track list
//! - `GET /api/metadata/*filename`: resolved track metadata
//! - `GET /api/name`, `GET /api/location`: dashboard config scalars
//! - `GET /music/*filename`: media bytes with conditional caching and
//!   partial-content support
//! - anything else: conditionally-cached static assets

pub mod handlers;

use crate::library::MediaLibrary;
use aria_common::config::ServerConfig;
use axum::{
    extract::State,
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Music library and metadata cache
    pub library: Arc<MediaLibrary>,
    /// Server configuration (static folder, display name, location)
    pub config: Arc<ServerConfig>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/music", get(handlers::list_music))
        .route("/api/metadata/*filename", get(handlers::get_metadata))
        .route("/api/name", get(handlers::get_name))
        .route("/api/location", get(handlers::get_location))
        .route("/music/*filename", get(handlers::serve_media))
        .fallback(get(handlers::serve_static))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "aria-ms",
        "version": env!("CARGO_PKG_VERSION"),
        "root_folder": state.library.root().display().to_string(),
    }))
}
