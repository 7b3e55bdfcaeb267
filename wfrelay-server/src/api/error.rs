//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use wfrelay_core::domain::workflow::OrchestrationOutcome;
use wfrelay_core::dto::workflow::ErrorResponse;
use wfrelay_engine::EngineError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    /// The request could not be turned into a tool invocation
    BadRequest(String),
    /// The tool failed or printed something unusable
    Tool(String),
    /// A lifecycle request failed; carries what was observed before the failure
    Workflow(OrchestrationOutcome),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg))
            }
            ApiError::Tool(msg) => {
                tracing::error!("Workflow tool error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(msg))
            }
            ApiError::Workflow(outcome) => {
                let message = outcome
                    .error
                    .as_ref()
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "Workflow request failed".to_string());
                tracing::error!("Workflow request failed: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: message,
                        workflow_response: Some(outcome),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        if err.is_build_error() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Tool(err.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
