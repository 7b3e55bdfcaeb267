//! Workflow endpoints

use reqwest::multipart::{Form, Part};
use serde_json::Value as JsonValue;
use wfrelay_core::domain::parameters::ParameterBag;
use wfrelay_core::domain::workflow::{OrchestrationOutcome, OutputMode};
use wfrelay_core::dto::health::HealthResponse;
use wfrelay_core::dto::workflow::{GetStatusRequest, WorkflowResponse};

use crate::RelayClient;
use crate::error::{ClientError, Result};

impl RelayClient {
    /// Check that the relay is up
    pub async fn health(&self) -> Result<HealthResponse> {
        let response = self.client.get(self.url("/")).send().await?;

        self.handle_response(response).await
    }

    /// Submit a workflow and return the tool's decoded submit output
    ///
    /// With [`OutputMode::Text`] the result is a flat object of the
    /// `Key: value` lines the tool printed.
    pub async fn submit(&self, params: &ParameterBag, mode: OutputMode) -> Result<JsonValue> {
        let response = self
            .client
            .post(self.url("/submit"))
            .query(&[("output", mode_param(mode))])
            .json(params)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Upload a manifest and submit it
    ///
    /// `params` must not name a manifest; the uploaded one is used.
    pub async fn submit_upload(
        &self,
        manifest: Vec<u8>,
        params: &ParameterBag,
        mode: OutputMode,
    ) -> Result<JsonValue> {
        let form = upload_form(manifest, params)?;
        let response = self
            .client
            .post(self.url("/submit"))
            .query(&[("output", mode_param(mode))])
            .multipart(form)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Submit, watch and fetch a workflow in one call
    ///
    /// When the workflow was submitted but watching or fetching failed, the
    /// error is [`ClientError::WorkflowFailed`] and carries the partial outcome.
    pub async fn run(&self, params: &ParameterBag) -> Result<OrchestrationOutcome> {
        let response = self.client.post(self.url("/e2e")).json(params).send().await?;

        self.handle_response::<WorkflowResponse>(response)
            .await
            .map(|r| r.workflow_response)
    }

    /// Upload a manifest and run it through the full lifecycle
    pub async fn run_upload(
        &self,
        manifest: Vec<u8>,
        params: &ParameterBag,
    ) -> Result<OrchestrationOutcome> {
        let form = upload_form(manifest, params)?;
        let response = self
            .client
            .post(self.url("/e2e"))
            .multipart(form)
            .send()
            .await?;

        self.handle_response::<WorkflowResponse>(response)
            .await
            .map(|r| r.workflow_response)
    }

    /// Fetch the current status of a submitted workflow
    pub async fn get_status(
        &self,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<OrchestrationOutcome> {
        let request = GetStatusRequest {
            name: name.into(),
            namespace: namespace.into(),
        };
        if request.name.is_empty() || request.namespace.is_empty() {
            return Err(ClientError::InvalidRequest(
                "workflow name and namespace are required".to_string(),
            ));
        }

        let response = self
            .client
            .post(self.url("/get"))
            .json(&request)
            .send()
            .await?;

        self.handle_response::<WorkflowResponse>(response)
            .await
            .map(|r| r.workflow_response)
    }
}

fn mode_param(mode: OutputMode) -> &'static str {
    match mode {
        OutputMode::Json => "json",
        OutputMode::Text => "text",
    }
}

fn upload_form(manifest: Vec<u8>, params: &ParameterBag) -> Result<Form> {
    let parameters = serde_yaml::to_string(params)
        .map_err(|e| ClientError::InvalidRequest(format!("cannot encode parameters: {}", e)))?;

    let manifest = Part::bytes(manifest)
        .file_name("manifest.yaml")
        .mime_str("application/yaml")?;

    Ok(Form::new()
        .part("manifest", manifest)
        .text("parameters", parameters))
}
