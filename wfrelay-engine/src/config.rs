//! Engine configuration

use std::time::Duration;

/// Default path of the workflow tool binary
pub const DEFAULT_TOOL_PATH: &str = "argo";

/// Settings for driving the workflow tool
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path (or name on `PATH`) of the workflow tool
    pub tool_path: String,

    /// Deadline for the submit and get invocations
    pub step_timeout: Duration,

    /// Deadline for the watch invocation, which blocks until the workflow finishes
    pub watch_timeout: Duration,
}

impl EngineConfig {
    pub fn new(tool_path: impl Into<String>) -> Self {
        Self {
            tool_path: tool_path.into(),
            step_timeout: Duration::from_secs(120),
            watch_timeout: Duration::from_secs(3600),
        }
    }

    pub fn with_timeouts(mut self, step_timeout: Duration, watch_timeout: Duration) -> Self {
        self.step_timeout = step_timeout;
        self.watch_timeout = watch_timeout;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_PATH)
    }
}
