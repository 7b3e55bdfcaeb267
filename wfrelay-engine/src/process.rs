//! Process execution for tool invocations
//!
//! Runs a [`CommandSpec`] as a child process without a shell and captures
//! what it printed. The child is killed if the future running it is dropped,
//! so an enclosing timeout or a cancelled request never leaves it behind.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error};

use crate::command::CommandSpec;
use crate::error::{EngineError, Result};

/// Outcome of one tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_succeeded: bool,
    /// Standard output followed by standard error
    pub raw_output: Vec<u8>,
    /// Trimmed output of a failed invocation
    pub error_text: Option<String>,
}

impl ExecutionResult {
    pub fn success(raw_output: impl Into<Vec<u8>>) -> Self {
        Self {
            exit_succeeded: true,
            raw_output: raw_output.into(),
            error_text: None,
        }
    }

    pub fn failure(raw_output: impl Into<Vec<u8>>) -> Self {
        let raw_output = raw_output.into();
        let error_text = String::from_utf8_lossy(&raw_output).trim().to_string();
        Self {
            exit_succeeded: false,
            raw_output,
            error_text: Some(error_text),
        }
    }
}

/// Runs tool invocations
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs one invocation and waits for it to exit
    ///
    /// A non-zero exit is reported through [`ExecutionResult::exit_succeeded`];
    /// `Err` means the process could not be run at all.
    async fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult>;
}

/// Runs invocations as OS child processes
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
        debug!("Running: {}", spec);

        let output = Command::new(spec.program())
            .args(spec.args())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: spec.program().to_string(),
                source,
            })?;

        let mut combined = output.stdout;
        combined.extend_from_slice(&output.stderr);

        if output.status.success() {
            debug!(
                "Command completed successfully: output_len={}",
                combined.len()
            );
            return Ok(ExecutionResult::success(combined));
        }

        let mut result = ExecutionResult::failure(combined);
        if result.error_text.as_deref() == Some("") {
            result.error_text = Some(format!(
                "{} exited with {}",
                spec.program(),
                output.status
            ));
        }

        error!(
            "Command failed: cmd='{}' exit_code={} output='{}'",
            spec,
            output.status.code().unwrap_or(-1),
            result.error_text.as_deref().unwrap_or_default()
        );

        Ok(result)
    }
}
