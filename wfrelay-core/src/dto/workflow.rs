//! Workflow DTOs for the submit, lifecycle and status endpoints

use serde::{Deserialize, Serialize};

use crate::domain::workflow::{OrchestrationOutcome, OutputMode, WorkflowIdentity};

/// Request body of the status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetStatusRequest {
    pub name: String,
    pub namespace: String,
}

impl From<GetStatusRequest> for WorkflowIdentity {
    fn from(req: GetStatusRequest) -> Self {
        WorkflowIdentity {
            name: req.name,
            namespace: req.namespace,
        }
    }
}

/// Query string of the submit endpoint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubmitQuery {
    pub output: Option<OutputMode>,
}

/// Successful lifecycle or status response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowResponse {
    pub workflow_response: OrchestrationOutcome,
}

/// Error body returned with a non-2xx status
///
/// Lifecycle failures after submission also carry the partial outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "Error")]
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_response: Option<OrchestrationOutcome>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            workflow_response: None,
        }
    }
}
