//! Workflow Relay CLI
//!
//! Command-line interface for submitting and inspecting workflows through
//! a running relay.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "wfrelay")]
#[command(about = "Workflow relay CLI", long_about = None)]
struct Cli {
    /// Relay server URL
    #[arg(long, env = "WFRELAY_SERVER_URL", default_value = "http://localhost:8003")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
