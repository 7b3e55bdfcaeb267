//! Step summaries from workflow status documents
//!
//! A status document lists its steps under `status.nodes`, keyed by node id.
//! Each node may carry a `phase`, a `message` and an `outputs` block whose
//! `artifacts` point at an object store.

use std::collections::BTreeMap;

use serde_json::Value as JsonValue;
use tracing::debug;
use wfrelay_core::domain::step::{ArtifactRef, NO_INFORMATION, StepSummary};

use crate::error::{EngineError, Result};

/// Overall phase of the workflow, if the document reports one
pub fn workflow_phase(document: &JsonValue) -> Option<String> {
    document
        .pointer("/status/phase")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

/// Summarizes the node with the given id
pub fn extract_step(document: &JsonValue, node_id: &str) -> Result<StepSummary> {
    let node = nodes(document)?
        .and_then(|nodes| nodes.get(node_id))
        .ok_or_else(|| EngineError::Decode(format!("status has no step '{}'", node_id)))?;

    Ok(summarize(node, display_name(node, node_id).to_string()))
}

/// Summarizes every node, ordered by step name
///
/// Steps are keyed by display name. A node sharing its display name with an
/// earlier node is keyed `"<name> (<node id>)"` so both are kept.
pub fn extract_steps(document: &JsonValue) -> Result<Vec<StepSummary>> {
    let Some(nodes) = nodes(document)? else {
        debug!("Status document has no nodes yet");
        return Ok(Vec::new());
    };

    let mut by_name: BTreeMap<String, StepSummary> = BTreeMap::new();
    for (node_id, node) in nodes {
        let mut name = display_name(node, node_id).to_string();
        if by_name.contains_key(&name) {
            name = format!("{} ({})", name, node_id);
        }
        let summary = summarize(node, name.clone());
        by_name.insert(name, summary);
    }

    debug!("Extracted {} step summaries", by_name.len());
    Ok(by_name.into_values().collect())
}

fn nodes(document: &JsonValue) -> Result<Option<&serde_json::Map<String, JsonValue>>> {
    match document.pointer("/status/nodes") {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Object(nodes)) => Ok(Some(nodes)),
        Some(_) => Err(EngineError::Decode(
            "status.nodes is not an object".to_string(),
        )),
    }
}

fn display_name<'a>(node: &'a JsonValue, node_id: &'a str) -> &'a str {
    node.get("displayName")
        .and_then(JsonValue::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or(node_id)
}

fn summarize(node: &JsonValue, step_name: String) -> StepSummary {
    let phase = text_or_default(node, "phase");
    let message = text_or_default(node, "message");

    StepSummary {
        step_name,
        phase,
        message,
        artifacts: artifacts(node),
    }
}

fn text_or_default(node: &JsonValue, field: &str) -> String {
    node.get(field)
        .and_then(JsonValue::as_str)
        .unwrap_or(NO_INFORMATION)
        .to_string()
}

fn artifacts(node: &JsonValue) -> Vec<ArtifactRef> {
    let outputs = match node.get("outputs") {
        None | Some(JsonValue::Null) => return vec![ArtifactRef::unavailable()],
        Some(outputs) => outputs,
    };

    outputs
        .get("artifacts")
        .and_then(JsonValue::as_array)
        .map(|list| list.iter().map(artifact_ref).collect())
        .unwrap_or_default()
}

fn artifact_ref(artifact: &JsonValue) -> ArtifactRef {
    let name = artifact
        .get("name")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string();

    match artifact.get("s3").filter(|s3| s3.is_object()) {
        Some(s3) => {
            let field = |key: &str| {
                s3.get(key)
                    .and_then(JsonValue::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            ArtifactRef::ObjectStore {
                name,
                bucket: field("bucket"),
                endpoint: field("endpoint"),
                key: field("key"),
            }
        }
        None => ArtifactRef::Unknown {
            name,
            raw: artifact.clone(),
        },
    }
}
