//! Workflow command handlers
//!
//! Submits workflows, runs them end to end and shows their step summaries.

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use serde_json::Value as JsonValue;
use wfrelay_client::{ClientError, RelayClient};
use wfrelay_core::domain::parameters::{MANIFEST_KEY, NAMESPACE_KEY, ParameterBag};
use wfrelay_core::domain::step::{ArtifactRef, StepSummary};
use wfrelay_core::domain::workflow::{OrchestrationOutcome, OutputMode};

/// Arguments shared by `submit` and `run`
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Manifest path as seen by the relay, or a local file with --upload
    manifest: String,

    /// Namespace to submit into
    #[arg(short, long)]
    namespace: Option<String>,

    /// Workflow parameters as key=value pairs (e.g., -p message=hello)
    #[arg(short, long, value_parser = parse_key_val)]
    param: Vec<(String, String)>,

    /// Read the manifest locally and upload it
    #[arg(long)]
    upload: bool,
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow::anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    if pos == 0 {
        anyhow::bail!("invalid KEY=value: empty key in `{}`", s);
    }
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

impl SubmitArgs {
    /// Parameters sent to the relay
    ///
    /// The manifest reference comes first, so it lands first on the
    /// tool's command line. Uploads leave it out; the relay adds the
    /// uploaded file itself.
    fn parameters(&self) -> Result<ParameterBag> {
        let mut params = ParameterBag::new();
        if !self.upload {
            params.insert(MANIFEST_KEY, self.manifest.as_str())?;
        }
        if let Some(namespace) = &self.namespace {
            params.insert(NAMESPACE_KEY, namespace.as_str())?;
        }
        for (key, value) in &self.param {
            params.insert(key.as_str(), value.as_str())?;
        }
        Ok(params)
    }

    async fn read_manifest(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.manifest)
            .await
            .with_context(|| format!("Failed to read manifest file: {}", self.manifest))
    }
}

/// Submit a workflow and print what the tool reported
pub async fn submit(client: &RelayClient, args: SubmitArgs, text: bool) -> Result<()> {
    let mode = if text { OutputMode::Text } else { OutputMode::Json };
    let params = args.parameters()?;

    let output = if args.upload {
        let manifest = args.read_manifest().await?;
        client.submit_upload(manifest, &params, mode).await?
    } else {
        client.submit(&params, mode).await?
    };

    println!("{}", "✓ Workflow submitted".green().bold());
    print_submit_output(&output)?;
    Ok(())
}

/// Run a workflow through submit, watch and fetch
pub async fn run(client: &RelayClient, args: SubmitArgs) -> Result<()> {
    let params = args.parameters()?;

    let result = if args.upload {
        let manifest = args.read_manifest().await?;
        client.run_upload(manifest, &params).await
    } else {
        client.run(&params).await
    };

    show_outcome(result)
}

/// Show the steps of an already submitted workflow
pub async fn status(client: &RelayClient, name: &str, namespace: &str) -> Result<()> {
    show_outcome(client.get_status(name, namespace).await)
}

fn show_outcome(result: wfrelay_client::Result<OrchestrationOutcome>) -> Result<()> {
    match result {
        Ok(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        Err(ClientError::WorkflowFailed {
            message, outcome, ..
        }) => {
            print_outcome(&outcome);
            println!();
            anyhow::bail!(message)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_submit_output(output: &JsonValue) -> Result<()> {
    match output {
        JsonValue::Object(fields) if fields.values().all(JsonValue::is_string) => {
            let width = fields.keys().map(String::len).max().unwrap_or(0);
            for (key, value) in fields {
                let value = value.as_str().unwrap_or_default();
                println!("  {:width$}  {}", format!("{}:", key), value.cyan(), width = width + 1);
            }
        }
        other => println!("{}", serde_json::to_string_pretty(other)?),
    }
    Ok(())
}

fn print_outcome(outcome: &OrchestrationOutcome) {
    if let Some(workflow) = &outcome.workflow {
        println!("{} {}", "Workflow:".bold(), workflow.to_string().cyan());
    }
    if let Some(phase) = &outcome.phase {
        println!("{} {}", "Phase:   ".bold(), colorize_phase(phase));
    }
    if let Some(error) = &outcome.error {
        println!(
            "{} {} failed: {}",
            "Error:   ".bold(),
            error.stage.to_string().red(),
            error.message.red()
        );
    }

    if outcome.steps.is_empty() {
        println!("{}", "No steps reported.".yellow());
        return;
    }

    println!();
    println!("{}", format!("{} step(s):", outcome.steps.len()).bold());
    for step in &outcome.steps {
        print_step(step);
    }
}

fn print_step(step: &StepSummary) {
    println!("  {} {} [{}]", "▸".cyan(), step.step_name.bold(), colorize_phase(&step.phase));
    println!("    Message: {}", step.message.dimmed());
    for artifact in &step.artifacts {
        println!("    {}", describe_artifact(artifact));
    }
}

fn describe_artifact(artifact: &ArtifactRef) -> String {
    match artifact {
        ArtifactRef::ObjectStore {
            name,
            bucket,
            endpoint,
            key,
        } => format!(
            "Artifact {}: s3://{}/{} {}",
            name.cyan(),
            bucket,
            key,
            format!("({})", endpoint).dimmed()
        ),
        ArtifactRef::Unknown { name, raw } => {
            format!("Artifact {}: {}", name.cyan(), raw.to_string().dimmed())
        }
        ArtifactRef::Unavailable { message } => message.dimmed().to_string(),
    }
}

fn colorize_phase(phase: &str) -> ColoredString {
    match phase {
        "Succeeded" => phase.green(),
        "Failed" | "Error" => phase.red(),
        "Running" | "Pending" => phase.yellow(),
        _ => phase.normal(),
    }
}
