//! Clearinghouse HTTP client
//!
//! The reqwest-backed adapter for `ExchangeGateway`. Each call is a single
//! POST of the message bundle to the clearinghouse process-message
//! endpoint; HTTP failures are mapped onto `PortError` and surfaced to the
//! caller unchanged. Nothing is retried here.

use async_trait::async_trait;
use chrono::Utc;
use std::time::{Duration, Instant};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckable, HealthCheckResult, PortError};

use crate::bundle::MessageBundle;
use crate::ports::ExchangeGateway;

/// Configuration for the clearinghouse connection
#[derive(Debug, Clone)]
pub struct NphiesConfig {
    /// Base URL of the clearinghouse API
    pub base_url: String,
    /// Bearer token presented on each request, if the environment issues one
    pub bearer_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for NphiesConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            bearer_token: None,
            timeout_secs: 30,
        }
    }
}

/// HTTP adapter for the clearinghouse gateway
#[derive(Debug, Clone)]
pub struct NphiesClient {
    config: NphiesConfig,
    http: reqwest::Client,
}

impl NphiesClient {
    /// Creates a new client with the given configuration
    pub fn new(config: NphiesConfig) -> Result<Self, PortError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Returns the configured base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn message_url(&self) -> String {
        format!("{}/$process-message", self.config.base_url.trim_end_matches('/'))
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn map_response(
        &self,
        response: reqwest::Response,
    ) -> Result<MessageBundle, PortError> {
        let status = response.status();

        if status.is_success() {
            return response.json::<MessageBundle>().await.map_err(|e| {
                PortError::validation(format!("clearinghouse response did not parse: {}", e))
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status.as_u16() {
            404 => PortError::not_found("Clearinghouse resource", self.message_url()),
            401 | 403 => PortError::Unauthorized {
                message: format!("clearinghouse rejected credentials: {}", body),
            },
            429 => PortError::RateLimited { retry_after_secs: 60 },
            code if code >= 500 => PortError::ServiceUnavailable {
                service: format!("clearinghouse ({}): {}", code, body),
            },
            code => PortError::internal(format!("clearinghouse returned {}: {}", code, body)),
        })
    }

    fn map_transport_error(&self, error: reqwest::Error) -> PortError {
        if error.is_timeout() {
            PortError::Timeout {
                operation: "process-message".to_string(),
                duration_ms: self.config.timeout_secs * 1000,
            }
        } else if error.is_connect() {
            PortError::connection(format!("clearinghouse unreachable: {}", error))
        } else {
            PortError::internal(format!("clearinghouse call failed: {}", error))
        }
    }
}

impl DomainPort for NphiesClient {}

#[async_trait]
impl HealthCheckable for NphiesClient {
    /// Pings the clearinghouse base URL
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();
        let result = self
            .apply_auth(self.http.get(&self.config.base_url))
            .send()
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(response) if response.status().is_success() => (AdapterHealth::Healthy, None),
            Ok(response) => (
                AdapterHealth::Degraded,
                Some(format!("clearinghouse answered {}", response.status())),
            ),
            Err(e) => (AdapterHealth::Unhealthy, Some(e.to_string())),
        };

        HealthCheckResult {
            adapter_id: "nphies-client".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl ExchangeGateway for NphiesClient {
    async fn exchange(&self, bundle: &MessageBundle) -> Result<MessageBundle, PortError> {
        tracing::debug!(url = %self.message_url(), bundle_id = %bundle.id, "submitting bundle");

        let response = self
            .apply_auth(self.http.post(self.message_url()).json(bundle))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        self.map_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_url_strips_trailing_slash() {
        let client = NphiesClient::new(NphiesConfig {
            base_url: "https://hsb.example.sa/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.message_url(), "https://hsb.example.sa/$process-message");
    }

    #[test]
    fn test_default_timeout() {
        let config = NphiesConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.bearer_token.is_none());
    }
}
