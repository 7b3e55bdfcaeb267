//! Wfrelay Server
//!
//! HTTP front end that drives the workflow tool on behalf of callers.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wfrelay_engine::Orchestrator;

pub mod api;
pub mod config;

use crate::api::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wfrelay_server=debug,wfrelay_engine=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Wfrelay Server...");

    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        "Loaded configuration: tool={}, step_timeout={:?}, watch_timeout={:?}, upload_dir={}",
        config.tool_path,
        config.step_timeout,
        config.watch_timeout,
        config.upload_dir.display()
    );

    let state = AppState {
        orchestrator: Arc::new(Orchestrator::with_process_runner(config.engine_config())),
        upload_dir: config.upload_dir.clone(),
    };

    let app = api::create_router(state, config.max_upload_bytes);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
