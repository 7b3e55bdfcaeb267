//! Step and artifact domain types

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Placeholder used when the status document carries no phase or message
pub const NO_INFORMATION: &str = "No information available";

/// Placeholder recorded when a step declares no outputs block at all
pub const NO_ARTIFACTS: &str = "No artifacts available";

/// Summary of one step (node) of a workflow as reported by the tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSummary {
    pub step_name: String,
    pub phase: String,
    pub message: String,
    pub artifacts: Vec<ArtifactRef>,
}

/// Reference to data produced by a step
///
/// Only object-store artifacts are modeled. Anything else keeps the raw
/// artifact document so callers can still see it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ArtifactRef {
    ObjectStore {
        name: String,
        bucket: String,
        endpoint: String,
        key: String,
    },
    Unknown {
        name: String,
        raw: JsonValue,
    },
    /// Marker for a step without an outputs block
    Unavailable { message: String },
}

impl ArtifactRef {
    /// The marker used when a step declares no outputs
    pub fn unavailable() -> Self {
        ArtifactRef::Unavailable {
            message: NO_ARTIFACTS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_serializes_with_kind_tag() {
        let artifact = ArtifactRef::ObjectStore {
            name: "out".to_string(),
            bucket: "b".to_string(),
            endpoint: "e".to_string(),
            key: "k".to_string(),
        };

        let json = serde_json::to_value(&artifact).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "ObjectStore",
                "name": "out",
                "bucket": "b",
                "endpoint": "e",
                "key": "k"
            })
        );
    }

    #[test]
    fn test_unavailable_marker() {
        let marker = ArtifactRef::unavailable();
        assert_eq!(
            serde_json::to_value(&marker).unwrap(),
            serde_json::json!({"kind": "Unavailable", "message": NO_ARTIFACTS})
        );
    }
}
