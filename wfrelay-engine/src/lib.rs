//! Wfrelay Engine
//!
//! Drives an external workflow-execution tool through its submit, watch and
//! get lifecycle and normalizes what it prints.
//!
//! Architecture:
//! - `command`: builds one argument vector per invocation from a parameter bag
//! - `process`: runs an argument vector as a child process
//! - `decode`: reads the tool's key/value text or JSON output
//! - `artifacts`: summarizes every step of a workflow status document
//! - `orchestrator`: sequences the steps and shapes partial failures
//! - `upload`: scoped temporary files for uploaded manifests

pub mod artifacts;
pub mod command;
pub mod config;
pub mod decode;
pub mod error;
pub mod orchestrator;
pub mod process;
pub mod upload;

pub use command::{ArgumentBuilder, ArgumentRule, CommandSpec, RuleTable, Subcommand};
pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use orchestrator::{Orchestrator, Submission};
pub use process::{CommandRunner, ExecutionResult, ProcessRunner};
pub use upload::ManifestUpload;
