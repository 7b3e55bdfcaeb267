//! Workflow API Handlers
//!
//! HTTP endpoints for submitting workflows, running them end to end and
//! reading their status.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde_json::Value as JsonValue;
use tracing::Instrument;
use uuid::Uuid;
use wfrelay_core::domain::workflow::WorkflowIdentity;
use wfrelay_core::dto::workflow::{GetStatusRequest, SubmitQuery, WorkflowResponse};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::api::payload::SubmitPayload;

/// POST /submit
/// Submit a workflow and return the tool's submission metadata
pub async fn submit(
    State(state): State<AppState>,
    Query(query): Query<SubmitQuery>,
    payload: SubmitPayload,
) -> ApiResult<Json<JsonValue>> {
    let mode = query.output.unwrap_or_default();
    let span = tracing::info_span!("submit", request_id = %Uuid::new_v4());

    async move {
        tracing::info!("Submitting workflow ({} parameter(s))", payload.params.len());

        let submission = state
            .orchestrator
            .submit(&payload.params, mode)
            .await
            .map_err(ApiError::from);
        drop(payload);

        submission.map(|s| Json(s.metadata))
    }
    .instrument(span)
    .await
}

/// POST /e2e
/// Submit a workflow, wait for it to finish and return its per-step summary
pub async fn run_lifecycle(
    State(state): State<AppState>,
    payload: SubmitPayload,
) -> ApiResult<Json<WorkflowResponse>> {
    let span = tracing::info_span!("e2e", request_id = %Uuid::new_v4());

    async move {
        tracing::info!("Running workflow lifecycle");

        let outcome = state.orchestrator.run_lifecycle(&payload.params).await;
        drop(payload);

        if outcome.is_success() {
            Ok(Json(WorkflowResponse {
                workflow_response: outcome,
            }))
        } else {
            Err(ApiError::Workflow(outcome))
        }
    }
    .instrument(span)
    .await
}

/// POST /get
/// Read the status of an existing workflow
pub async fn get_status(
    State(state): State<AppState>,
    body: Result<Json<GetStatusRequest>, JsonRejection>,
) -> ApiResult<Json<WorkflowResponse>> {
    let Json(req) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if req.name.is_empty() || req.namespace.is_empty() {
        return Err(ApiError::BadRequest(
            "name and namespace are required".to_string(),
        ));
    }

    let identity = WorkflowIdentity::from(req);
    let span = tracing::info_span!("get", request_id = %Uuid::new_v4(), workflow = %identity);

    async move {
        let outcome = state.orchestrator.get_status(identity).await;

        match outcome.error {
            None => Ok(Json(WorkflowResponse {
                workflow_response: outcome,
            })),
            Some(error) => Err(ApiError::Tool(error.message)),
        }
    }
    .instrument(span)
    .await
}
