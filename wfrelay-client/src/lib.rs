//! Workflow Relay HTTP Client
//!
//! A small, typed client for the relay's HTTP API, used by the CLI.
//!
//! # Example
//!
//! ```no_run
//! use wfrelay_client::RelayClient;
//! use wfrelay_core::domain::parameters::ParameterBag;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RelayClient::new("http://localhost:8003");
//!
//!     let params = ParameterBag::new()
//!         .with("manifest", "hello-world.yaml")?
//!         .with("namespace", "argo")?;
//!
//!     let outcome = client.run(&params).await?;
//!     println!("{} steps reported", outcome.steps.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod workflows;

pub use error::{ClientError, Result};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the relay API
#[derive(Debug, Clone)]
pub struct RelayClient {
    /// Base URL of the relay (e.g., "http://localhost:8003")
    base_url: String,
    client: Client,
}

impl RelayClient {
    /// Create a new relay client
    ///
    /// # Example
    /// ```
    /// use wfrelay_client::RelayClient;
    ///
    /// let client = RelayClient::new("http://localhost:8003");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a relay client with a custom HTTP client
    ///
    /// Lifecycle requests block until the workflow finishes, so callers that
    /// set a request timeout should make it generous.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the relay
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!("Relay returned {}: {}", status, error_text);
            return Err(ClientError::from_response_body(status.as_u16(), &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
