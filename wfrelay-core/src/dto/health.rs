//! Liveness DTOs

use serde::{Deserialize, Serialize};

/// Body of the liveness endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: "Success".to_string(),
            message: "Up and Running".to_string(),
        }
    }
}
