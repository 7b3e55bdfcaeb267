//! Error types for the relay client

use thiserror::Error;
use wfrelay_core::domain::workflow::OrchestrationOutcome;
use wfrelay_core::dto::workflow::ErrorResponse;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the relay client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// A lifecycle request failed; the outcome shows how far it got
    #[error("workflow request failed (status {status}): {message}")]
    WorkflowFailed {
        status: u16,
        message: String,
        outcome: Box<OrchestrationOutcome>,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Builds the error for a non-success response body
    ///
    /// Bodies in the relay's `{"Error": ...}` shape are unpacked; anything
    /// else is kept as raw text.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(ErrorResponse {
                error,
                workflow_response: Some(outcome),
            }) => Self::WorkflowFailed {
                status,
                message: error,
                outcome: Box::new(outcome),
            },
            Ok(ErrorResponse { error, .. }) => Self::api_error(status, error),
            Err(_) => Self::api_error(status, body.trim()),
        }
    }

    /// Partial outcome carried by a failed lifecycle request
    pub fn outcome(&self) -> Option<&OrchestrationOutcome> {
        match self {
            Self::WorkflowFailed { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}
