//! API configuration

use serde::Deserialize;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Clearinghouse base URL
    pub nphies_base_url: String,
    /// Bearer token for the clearinghouse, if the environment issues one
    pub nphies_bearer_token: Option<String>,
    /// Clearinghouse request timeout in seconds
    pub nphies_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/claims_exchange".to_string(),
            log_level: "info".to_string(),
            nphies_base_url: "https://hsb.nphies.sa".to_string(),
            nphies_bearer_token: None,
            nphies_timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
