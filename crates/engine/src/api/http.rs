//! HTTP routes.
//!
//! Small read-only surface next to the WebSocket endpoint: liveness,
//! the current state snapshot, and the static scene catalog.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use stagewire_protocol::{scenes, InstallationState, Scene};

use crate::state::StateAuthority;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<StateAuthority>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/state", get(get_state))
        .route("/api/scenes", get(get_scenes))
}

async fn health() -> &'static str {
    "OK"
}

async fn get_state(State(authority): State<Arc<StateAuthority>>) -> Json<InstallationState> {
    Json(authority.snapshot().await)
}

async fn get_scenes() -> Json<Vec<Scene>> {
    Json(scenes())
}
