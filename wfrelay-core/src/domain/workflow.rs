//! Workflow lifecycle domain types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::step::StepSummary;

/// Name and namespace of a workflow accepted by the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowIdentity {
    pub name: String,
    pub namespace: String,
}

impl fmt::Display for WorkflowIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Furthest lifecycle state a request reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Progress {
    Idle,
    Submitted,
    Watched,
    Fetched,
}

/// A step of the remote operation that can fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Submit,
    Watch,
    Fetch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Submit => "submit",
            Stage::Watch => "watch",
            Stage::Fetch => "fetch",
        };
        f.write_str(name)
    }
}

/// How the tool is asked to format its output, and so how it is decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Json,
    Text,
}

/// Failure recorded against the stage it happened in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageError {
    pub stage: Stage,
    pub message: String,
}

/// Everything observed while driving one request through the tool
///
/// A failed request still carries what happened before the failure, so a
/// watch failure keeps the identity of the workflow that was accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationOutcome {
    pub progress: Progress,
    pub workflow: Option<WorkflowIdentity>,
    /// Overall workflow phase from the status document, when fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
    pub steps: Vec<StepSummary>,
    pub error: Option<StageError>,
}

impl OrchestrationOutcome {
    pub fn new() -> Self {
        Self {
            progress: Progress::Idle,
            workflow: None,
            phase: None,
            steps: Vec::new(),
            error: None,
        }
    }

    /// Outcome for a status lookup of a workflow that already exists
    pub fn for_workflow(identity: WorkflowIdentity) -> Self {
        Self {
            workflow: Some(identity),
            ..Self::new()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// True when the failure happened after the workflow was accepted
    pub fn is_partial_failure(&self) -> bool {
        matches!(
            &self.error,
            Some(StageError { stage: Stage::Watch | Stage::Fetch, .. })
        ) && self.progress >= Progress::Submitted
    }

    pub fn step(&self, name: &str) -> Option<&StepSummary> {
        self.steps.iter().find(|s| s.step_name == name)
    }
}

impl Default for OrchestrationOutcome {
    fn default() -> Self {
        Self::new()
    }
}
