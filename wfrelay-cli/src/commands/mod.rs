//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod health;
mod workflow;

pub use workflow::SubmitArgs;

use anyhow::Result;
use clap::Subcommand;
use wfrelay_client::RelayClient;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Check that the relay is up
    Health,
    /// Submit a workflow without waiting for it
    Submit {
        #[command(flatten)]
        args: SubmitArgs,

        /// Ask the tool for its plain-text summary instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Submit a workflow, wait for it and show its steps
    Run {
        #[command(flatten)]
        args: SubmitArgs,
    },
    /// Show the steps of a submitted workflow
    Status {
        /// Workflow name
        name: String,

        /// Namespace the workflow runs in
        #[arg(short, long)]
        namespace: String,
    },
}

/// Routes a command to its handler
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let client = RelayClient::new(&config.server_url);

    match command {
        Commands::Health => health::check_health(&client).await,
        Commands::Submit { args, text } => workflow::submit(&client, args, text).await,
        Commands::Run { args } => workflow::run(&client, args).await,
        Commands::Status { name, namespace } => {
            workflow::status(&client, &name, &namespace).await
        }
    }
}
