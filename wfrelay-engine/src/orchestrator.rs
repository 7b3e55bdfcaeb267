//! Workflow lifecycle orchestration
//!
//! Sequences the tool invocations for one request:
//!
//! ```text
//! Idle -> Submitted -> Watched -> Fetched
//!   \         \           \
//!    Failed(Submit)  Failed(Watch)  Failed(Fetch)
//! ```
//!
//! Each step starts only after the previous one succeeded. Nothing is
//! retried. A failure after submission is reported as a partial failure: the
//! workflow was accepted by the cluster and keeps running there.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tracing::{error, info, warn};
use wfrelay_core::domain::parameters::ParameterBag;
use wfrelay_core::domain::step::StepSummary;
use wfrelay_core::domain::workflow::{
    OrchestrationOutcome, OutputMode, Progress, Stage, StageError, WorkflowIdentity,
};

use crate::artifacts;
use crate::command::{ArgumentBuilder, CommandSpec, Subcommand};
use crate::config::EngineConfig;
use crate::decode::{self, ParsedOutput, SUBMIT_TEXT_FIELDS};
use crate::error::{EngineError, Result};
use crate::process::{CommandRunner, ExecutionResult, ProcessRunner};

/// Result of a successful submit step
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub workflow: WorkflowIdentity,
    /// Submission output as returned by the tool
    pub metadata: JsonValue,
}

/// Status of a workflow as read by the get step
#[derive(Debug, Clone, PartialEq)]
struct FetchedStatus {
    phase: Option<String>,
    steps: Vec<StepSummary>,
}

/// Drives the workflow tool for submit, lifecycle and status requests
///
/// Holds no per-request state; one instance serves concurrent requests.
pub struct Orchestrator {
    builder: ArgumentBuilder,
    runner: Arc<dyn CommandRunner>,
    config: EngineConfig,
}

impl Orchestrator {
    pub fn new(config: EngineConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            builder: ArgumentBuilder::new(config.tool_path.clone()),
            runner,
            config,
        }
    }

    /// Orchestrator running the tool as real child processes
    pub fn with_process_runner(config: EngineConfig) -> Self {
        Self::new(config, Arc::new(ProcessRunner::new()))
    }

    /// Submits a workflow and returns without watching it
    pub async fn submit(&self, params: &ParameterBag, mode: OutputMode) -> Result<Submission> {
        let spec = self.builder.build(Subcommand::Submit, params, mode);
        let result = self
            .execute(Stage::Submit, &spec, self.config.step_timeout)
            .await?;

        let parsed = decode::decode(&result.raw_output, mode, SUBMIT_TEXT_FIELDS)?;
        let workflow = parsed.identity()?;

        info!("Workflow {} submitted", workflow);

        Ok(Submission {
            workflow,
            metadata: parsed.into_json(),
        })
    }

    /// Submits a workflow, waits for it to finish and reads its final status
    pub async fn run_lifecycle(&self, params: &ParameterBag) -> OrchestrationOutcome {
        let mut outcome = OrchestrationOutcome::new();

        let submission = match self.submit(params, OutputMode::Json).await {
            Ok(submission) => submission,
            Err(e) => {
                error!("Submit failed: {}", e);
                outcome.error = Some(StageError {
                    stage: Stage::Submit,
                    message: e.to_string(),
                });
                return outcome;
            }
        };
        let workflow = submission.workflow;
        outcome.workflow = Some(workflow.clone());
        outcome.progress = Progress::Submitted;

        if let Err(e) = self.watch(&workflow).await {
            warn!("Watch failed for submitted workflow {}: {}", workflow, e);
            outcome.error = Some(partial_failure(Stage::Watch, &workflow, &e));
            return outcome;
        }
        outcome.progress = Progress::Watched;

        match self.fetch(&workflow).await {
            Ok(status) => {
                outcome.phase = status.phase;
                outcome.steps = status.steps;
                outcome.progress = Progress::Fetched;
                info!(
                    "Workflow {} finished with {} step(s)",
                    workflow,
                    outcome.steps.len()
                );
            }
            Err(e) => {
                warn!("Fetch failed for submitted workflow {}: {}", workflow, e);
                outcome.error = Some(partial_failure(Stage::Fetch, &workflow, &e));
            }
        }

        outcome
    }

    /// Reads the status of an existing workflow
    pub async fn get_status(&self, workflow: WorkflowIdentity) -> OrchestrationOutcome {
        let mut outcome = OrchestrationOutcome::for_workflow(workflow.clone());

        match self.fetch(&workflow).await {
            Ok(status) => {
                outcome.phase = status.phase;
                outcome.steps = status.steps;
                outcome.progress = Progress::Fetched;
            }
            Err(e) => {
                error!("Status fetch failed for {}: {}", workflow, e);
                outcome.error = Some(StageError {
                    stage: Stage::Fetch,
                    message: e.to_string(),
                });
            }
        }

        outcome
    }

    async fn watch(&self, workflow: &WorkflowIdentity) -> Result<()> {
        let spec = self.builder.build(
            Subcommand::Watch,
            &ParameterBag::from(workflow),
            OutputMode::Text,
        );
        self.execute(Stage::Watch, &spec, self.config.watch_timeout)
            .await?;

        info!("Workflow {} reached a finished state", workflow);
        Ok(())
    }

    async fn fetch(&self, workflow: &WorkflowIdentity) -> Result<FetchedStatus> {
        let mode = OutputMode::Json;
        let spec = self
            .builder
            .build(Subcommand::Get, &ParameterBag::from(workflow), mode);
        let result = self
            .execute(Stage::Fetch, &spec, self.config.step_timeout)
            .await?;

        let ParsedOutput::Document(document) = decode::decode(&result.raw_output, mode, 0)? else {
            return Err(EngineError::Decode(
                "status output is not a JSON document".to_string(),
            ));
        };

        Ok(FetchedStatus {
            phase: artifacts::workflow_phase(&document),
            steps: artifacts::extract_steps(&document)?,
        })
    }

    /// Runs one invocation under a deadline, turning a non-zero exit into an error
    async fn execute(
        &self,
        stage: Stage,
        spec: &CommandSpec,
        deadline: Duration,
    ) -> Result<ExecutionResult> {
        info!("Starting {} step", stage);

        let result = tokio::time::timeout(deadline, self.runner.run(spec))
            .await
            .map_err(|_| EngineError::Timeout {
                stage,
                after: deadline,
            })??;

        if !result.exit_succeeded {
            let text = result.error_text.clone().unwrap_or_default();
            return Err(EngineError::Execution(text));
        }

        Ok(result)
    }
}

fn partial_failure(stage: Stage, workflow: &WorkflowIdentity, err: &EngineError) -> StageError {
    StageError {
        stage,
        message: format!(
            "Workflow {} was submitted to namespace {} but its status is unavailable ({} failed): {}",
            workflow.name, workflow.namespace, stage, err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use wfrelay_core::domain::step::ArtifactRef;

    /// Replays scripted results and records every invocation
    #[derive(Default)]
    struct ScriptedRunner {
        responses: Mutex<VecDeque<ExecutionResult>>,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl ScriptedRunner {
        fn new(responses: Vec<ExecutionResult>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }

        fn subcommands(&self) -> Vec<String> {
            self.calls()
                .iter()
                .map(|spec| spec.args()[0].clone())
                .collect()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        async fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
            self.calls.lock().unwrap().push(spec.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| EngineError::Execution("unexpected invocation".to_string()))
        }
    }

    /// Never finishes, for deadline tests
    struct HangingRunner;

    #[async_trait]
    impl CommandRunner for HangingRunner {
        async fn run(&self, _spec: &CommandSpec) -> Result<ExecutionResult> {
            std::future::pending().await
        }
    }

    fn submitted(name: &str, namespace: &str) -> ExecutionResult {
        ExecutionResult::success(
            serde_json::to_vec(&json!({
                "metadata": {"name": name, "namespace": namespace},
                "status": {}
            }))
            .unwrap(),
        )
    }

    fn finished_status() -> ExecutionResult {
        ExecutionResult::success(
            serde_json::to_vec(&json!({
                "metadata": {"name": "wf-1", "namespace": "ns-a"},
                "status": {
                    "phase": "Succeeded",
                    "nodes": {
                        "wf-1-42": {
                            "displayName": "gen-data",
                            "phase": "Succeeded",
                            "outputs": {"artifacts": [
                                {"name": "data", "s3": {"bucket": "b", "endpoint": "e", "key": "k"}}
                            ]}
                        }
                    }
                }
            }))
            .unwrap(),
        )
    }

    fn params() -> ParameterBag {
        ParameterBag::new()
            .with("manifest", "https://example.com/wf.yaml")
            .and_then(|b| b.with("namespace", "ns-a"))
            .and_then(|b| b.with("message", "hi"))
            .unwrap()
    }

    fn orchestrator(runner: Arc<dyn CommandRunner>) -> Orchestrator {
        Orchestrator::new(EngineConfig::new("argo"), runner)
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let runner = ScriptedRunner::new(vec![
            submitted("wf-1", "ns-a"),
            ExecutionResult::success(b"Status: Succeeded\n".to_vec()),
            finished_status(),
        ]);

        let outcome = orchestrator(runner.clone()).run_lifecycle(&params()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.progress, Progress::Fetched);
        assert_eq!(outcome.phase.as_deref(), Some("Succeeded"));
        assert_eq!(outcome.steps.len(), 1);
        let step = outcome.step("gen-data").unwrap();
        assert_eq!(step.phase, "Succeeded");
        assert_eq!(
            step.artifacts,
            vec![ArtifactRef::ObjectStore {
                name: "data".to_string(),
                bucket: "b".to_string(),
                endpoint: "e".to_string(),
                key: "k".to_string(),
            }]
        );
        assert_eq!(runner.subcommands(), vec!["submit", "watch", "get"]);
    }

    #[tokio::test]
    async fn test_lifecycle_commands_use_submitted_identity() {
        let runner = ScriptedRunner::new(vec![
            submitted("wf-xyz", "ns-b"),
            ExecutionResult::success(Vec::new()),
            finished_status(),
        ]);

        orchestrator(runner.clone()).run_lifecycle(&params()).await;

        let calls = runner.calls();
        let tokens = |i: usize| calls[i].tokens().to_vec();
        assert_eq!(
            tokens(0),
            vec![
                "argo",
                "submit",
                "https://example.com/wf.yaml",
                "-n",
                "ns-a",
                "-p",
                "message=hi",
                "-o",
                "json"
            ]
        );
        assert_eq!(tokens(1), vec!["argo", "watch", "wf-xyz", "-n", "ns-b"]);
        assert_eq!(
            tokens(2),
            vec!["argo", "get", "wf-xyz", "-n", "ns-b", "-o", "json"]
        );
    }

    #[tokio::test]
    async fn test_submit_failure_stops_lifecycle() {
        let runner = ScriptedRunner::new(vec![ExecutionResult::failure(
            b"  manifest invalid\n".to_vec(),
        )]);

        let outcome = orchestrator(runner.clone()).run_lifecycle(&params()).await;

        assert_eq!(outcome.progress, Progress::Idle);
        assert_eq!(outcome.workflow, None);
        assert_eq!(
            outcome.error,
            Some(StageError {
                stage: Stage::Submit,
                message: "manifest invalid".to_string()
            })
        );
        assert!(!outcome.is_partial_failure());
        assert_eq!(runner.subcommands(), vec!["submit"]);
    }

    #[tokio::test]
    async fn test_watch_failure_is_partial() {
        let runner = ScriptedRunner::new(vec![
            submitted("wf-1", "ns-a"),
            ExecutionResult::failure(b"connection refused".to_vec()),
        ]);

        let outcome = orchestrator(runner.clone()).run_lifecycle(&params()).await;

        assert!(outcome.is_partial_failure());
        assert_eq!(outcome.progress, Progress::Submitted);
        assert!(outcome.steps.is_empty());
        let error = outcome.error.unwrap();
        assert_eq!(error.stage, Stage::Watch);
        assert!(error.message.contains("wf-1 was submitted"));
        assert!(error.message.contains("status is unavailable"));
        assert!(error.message.contains("connection refused"));
        assert_eq!(runner.subcommands(), vec!["submit", "watch"]);
    }

    #[tokio::test]
    async fn test_fetch_decode_failure_is_partial() {
        let runner = ScriptedRunner::new(vec![
            submitted("wf-1", "ns-a"),
            ExecutionResult::success(Vec::new()),
            ExecutionResult::success(b"Name: wf-1\n".to_vec()),
        ]);

        let outcome = orchestrator(runner).run_lifecycle(&params()).await;

        assert_eq!(outcome.progress, Progress::Watched);
        let error = outcome.error.unwrap();
        assert_eq!(error.stage, Stage::Fetch);
        assert!(error.message.contains("invalid JSON"));
        assert!(error.message.contains("was submitted"));
    }

    #[tokio::test]
    async fn test_submit_output_that_is_not_json_fails_submit() {
        let runner = ScriptedRunner::new(vec![ExecutionResult::success(
            b"Name: wf-1\nNamespace: ns-a\n".to_vec(),
        )]);

        let outcome = orchestrator(runner).run_lifecycle(&params()).await;

        let error = outcome.error.unwrap();
        assert_eq!(error.stage, Stage::Submit);
        assert!(error.message.contains("could not decode"));
    }

    #[tokio::test]
    async fn test_submit_only_text_mode() {
        let runner = ScriptedRunner::new(vec![ExecutionResult::success(
            b"Name:                hello-k2x\nNamespace:           ns-a\nStatus:              Pending\n"
                .to_vec(),
        )]);

        let submission = orchestrator(runner.clone())
            .submit(&params(), OutputMode::Text)
            .await
            .unwrap();

        assert_eq!(submission.workflow.name, "hello-k2x");
        assert_eq!(submission.metadata["Status"], "Pending");
        let calls = runner.calls();
        let call = &calls[0];
        assert!(!call.tokens().contains(&"-o".to_string()));
        assert_eq!(runner.subcommands(), vec!["submit"]);
    }

    #[tokio::test]
    async fn test_submit_only_json_returns_metadata() {
        let runner = ScriptedRunner::new(vec![submitted("wf-1", "ns-a")]);

        let submission = orchestrator(runner)
            .submit(&params(), OutputMode::Json)
            .await
            .unwrap();

        assert_eq!(submission.metadata["metadata"]["name"], "wf-1");
    }

    #[tokio::test]
    async fn test_get_status_skips_submit_and_watch() {
        let runner = ScriptedRunner::new(vec![finished_status()]);
        let identity = WorkflowIdentity {
            name: "wf-1".to_string(),
            namespace: "ns-a".to_string(),
        };

        let outcome = orchestrator(runner.clone()).get_status(identity.clone()).await;

        assert!(outcome.is_success());
        assert_eq!(outcome.workflow, Some(identity));
        assert_eq!(outcome.progress, Progress::Fetched);
        assert!(outcome.step("gen-data").is_some());
        assert_eq!(runner.subcommands(), vec!["get"]);
    }

    #[tokio::test]
    async fn test_get_status_failure() {
        let runner = ScriptedRunner::new(vec![ExecutionResult::failure(
            b"workflows.argoproj.io \"wf-9\" not found\n".to_vec(),
        )]);
        let identity = WorkflowIdentity {
            name: "wf-9".to_string(),
            namespace: "ns-a".to_string(),
        };

        let outcome = orchestrator(runner).get_status(identity).await;

        assert!(!outcome.is_partial_failure());
        assert_eq!(
            outcome.error.unwrap().message,
            "workflows.argoproj.io \"wf-9\" not found"
        );
    }

    #[tokio::test]
    async fn test_step_deadline() {
        let config =
            EngineConfig::new("argo").with_timeouts(Duration::from_millis(20), Duration::from_millis(20));
        let orchestrator = Orchestrator::new(config, Arc::new(HangingRunner));

        let err = orchestrator
            .submit(&params(), OutputMode::Json)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            EngineError::Timeout {
                stage: Stage::Submit,
                ..
            }
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_deadline_kills_child_process() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let orchestrator = Orchestrator::with_process_runner(EngineConfig::new("sh"));
        let spec = CommandSpec::new(
            "sh",
            vec![
                "-c".to_string(),
                format!("sleep 1; touch '{}'", marker.display()),
            ],
        );

        let err = orchestrator
            .execute(Stage::Watch, &spec, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Timeout {
                stage: Stage::Watch,
                ..
            }
        ));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    /// Echoes each invocation's own tokens back as its output
    struct EchoRunner;

    #[async_trait]
    impl CommandRunner for EchoRunner {
        async fn run(&self, spec: &CommandSpec) -> Result<ExecutionResult> {
            tokio::task::yield_now().await;
            let name = spec.args()[1].clone();
            let tokens = spec.tokens().to_vec();
            Ok(ExecutionResult::success(
                serde_json::to_vec(&json!({
                    "metadata": {"name": name, "namespace": "ns"},
                    "tokens": tokens
                }))
                .unwrap(),
            ))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_do_not_share_arguments() {
        let orchestrator = Arc::new(orchestrator(Arc::new(EchoRunner)));

        let mut handles = Vec::new();
        for i in 0..32 {
            let orchestrator = orchestrator.clone();
            handles.push(tokio::spawn(async move {
                let params = ParameterBag::new()
                    .with("manifest", format!("wf-{}.yaml", i))
                    .and_then(|b| b.with("owner", format!("request-{}", i)))
                    .unwrap();
                let submission = orchestrator.submit(&params, OutputMode::Json).await.unwrap();
                (i, submission.metadata)
            }));
        }

        for handle in handles {
            let (i, metadata) = handle.await.unwrap();
            let tokens: Vec<String> = serde_json::from_value(metadata["tokens"].clone()).unwrap();
            assert_eq!(
                tokens,
                vec![
                    "argo".to_string(),
                    "submit".to_string(),
                    format!("wf-{}.yaml", i),
                    "-p".to_string(),
                    format!("owner=request-{}", i),
                    "-o".to_string(),
                    "json".to_string(),
                ]
            );
        }
    }
}
