use anyhow::{Context, Result};
use colored::*;
use wfrelay_client::RelayClient;

pub async fn check_health(client: &RelayClient) -> Result<()> {
    let health = client
        .health()
        .await
        .with_context(|| format!("Relay at {} is not reachable", client.base_url()))?;

    println!("{} {}", "✓".green().bold(), health.message.bold());
    println!("  Status: {}", health.status.green());
    Ok(())
}
