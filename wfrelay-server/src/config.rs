//! Server configuration
//!
//! Settings for the HTTP listener, the workflow tool and manifest uploads.

use std::path::PathBuf;
use std::time::Duration;

use wfrelay_engine::EngineConfig;
use wfrelay_engine::config::DEFAULT_TOOL_PATH;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP listener binds to (e.g., "0.0.0.0:8003")
    pub bind_addr: String,

    /// Path of the workflow tool binary
    pub tool_path: String,

    /// Deadline for submit and get invocations
    pub step_timeout: Duration,

    /// Deadline for watching a workflow until it finishes
    pub watch_timeout: Duration,

    /// Directory for uploaded manifests
    pub upload_dir: PathBuf,

    /// Largest accepted request body
    pub max_upload_bytes: usize,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables (all optional):
    /// - BIND_HOST (default: 0.0.0.0)
    /// - PORT (default: 8003)
    /// - WORKFLOW_TOOL (default: argo)
    /// - STEP_TIMEOUT (seconds, default: 120)
    /// - WATCH_TIMEOUT (seconds, default: 3600)
    /// - UPLOAD_DIR (default: system temp dir)
    /// - MAX_UPLOAD_BYTES (default: 10 MiB)
    ///
    /// Unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("BIND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8003);

        let tool_path = std::env::var("WORKFLOW_TOOL").unwrap_or(defaults.tool_path);

        let step_timeout = std::env::var("STEP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.step_timeout);

        let watch_timeout = std::env::var("WATCH_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.watch_timeout);

        let upload_dir = std::env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.upload_dir);

        let max_upload_bytes = std::env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            bind_addr: format!("{}:{}", host, port),
            tool_path,
            step_timeout,
            watch_timeout,
            upload_dir,
            max_upload_bytes,
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tool_path.trim().is_empty() {
            anyhow::bail!("tool_path cannot be empty");
        }

        if self.step_timeout.is_zero() {
            anyhow::bail!("step_timeout must be greater than 0");
        }

        if self.watch_timeout.is_zero() {
            anyhow::bail!("watch_timeout must be greater than 0");
        }

        if !self.upload_dir.is_dir() {
            anyhow::bail!(
                "upload_dir {} is not an existing directory",
                self.upload_dir.display()
            );
        }

        if self.max_upload_bytes == 0 {
            anyhow::bail!("max_upload_bytes must be greater than 0");
        }

        Ok(())
    }

    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.tool_path.clone())
            .with_timeouts(self.step_timeout, self.watch_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            bind_addr: "0.0.0.0:8003".to_string(),
            tool_path: DEFAULT_TOOL_PATH.to_string(),
            step_timeout: engine.step_timeout,
            watch_timeout: engine.watch_timeout,
            upload_dir: std::env::temp_dir(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}
