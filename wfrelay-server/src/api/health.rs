//! Liveness API Handler

use axum::{Json, http::StatusCode};
use wfrelay_core::dto::health::HealthResponse;

/// GET /
/// Liveness check
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (StatusCode::OK, Json(HealthResponse::up()))
}
