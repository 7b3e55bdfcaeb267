//! CLI configuration

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the relay server
    pub server_url: String,
}
