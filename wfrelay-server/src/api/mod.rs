//! API Module
//!
//! HTTP API layer of the relay.
//! Each submodule handles one concern of the request path.

pub mod error;
pub mod health;
pub mod payload;
pub mod workflow;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use wfrelay_engine::Orchestrator;

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    /// Where uploaded manifests are written
    pub upload_dir: PathBuf,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        // Liveness
        .route("/", get(health::health_check))
        // Workflow endpoints
        .route("/submit", post(workflow::submit))
        .route("/e2e", post(workflow::run_lifecycle))
        .route("/get", post(workflow::get_status))
        // Add state and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}
