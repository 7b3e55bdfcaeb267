//! Error types for the engine

use std::time::Duration;

use thiserror::Error;
use wfrelay_core::domain::parameters::ParameterError;
use wfrelay_core::domain::workflow::Stage;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors raised while building, running or decoding a tool invocation
#[derive(Debug, Error)]
pub enum EngineError {
    /// Caller input could not be turned into an invocation; nothing was spawned
    #[error("invalid request: {0}")]
    Build(String),

    /// The tool binary could not be started
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool exited non-zero; carries its trimmed output verbatim
    #[error("{0}")]
    Execution(String),

    /// The stage did not finish before its deadline
    #[error("{stage} did not finish within {after:?}")]
    Timeout { stage: Stage, after: Duration },

    /// The output did not have the expected shape
    #[error("could not decode tool output: {0}")]
    Decode(String),

    /// An uploaded manifest could not be written to temporary storage
    #[error("failed to store uploaded manifest: {0}")]
    Upload(#[source] std::io::Error),
}

impl EngineError {
    /// Whether the error was caused by the request rather than the tool
    pub fn is_build_error(&self) -> bool {
        matches!(self, Self::Build(_) | Self::Upload(_))
    }
}

impl From<ParameterError> for EngineError {
    fn from(err: ParameterError) -> Self {
        EngineError::Build(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_is_verbatim() {
        let err = EngineError::Execution("manifest invalid".to_string());
        assert_eq!(err.to_string(), "manifest invalid");
        assert!(!err.is_build_error());
    }

    #[test]
    fn test_parameter_error_is_build_error() {
        let err: EngineError = ParameterError::EmptyKey.into();
        assert!(err.is_build_error());
    }

    #[test]
    fn test_timeout_message() {
        let err = EngineError::Timeout {
            stage: Stage::Watch,
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "watch did not finish within 30s");
    }

    #[test]
    fn test_timeout_message_below_one_second() {
        let err = EngineError::Timeout {
            stage: Stage::Submit,
            after: Duration::from_millis(100),
        };
        assert_eq!(err.to_string(), "submit did not finish within 100ms");
    }
}
