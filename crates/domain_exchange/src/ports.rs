//! Exchange Domain Ports
//!
//! The `ExchangeGateway` trait is the seam between the workflow and the
//! clearinghouse transport. Adapters: the reqwest-backed `NphiesClient`
//! and a scripted mock that counts outbound calls for tests.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError};

use crate::bundle::MessageBundle;

/// One synchronous round trip to the clearinghouse
///
/// Every workflow operation performs exactly one `exchange` call; there is
/// no retry or backoff at this seam. A transport failure surfaces to the
/// caller as the returned error.
#[async_trait]
pub trait ExchangeGateway: DomainPort + HealthCheckable {
    /// Sends a message bundle and returns the response bundle
    async fn exchange(&self, bundle: &MessageBundle) -> Result<MessageBundle, PortError>;
}

/// Scripted mock adapter for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Mock gateway returning pre-scripted responses in order
    ///
    /// Counts outbound calls so tests can assert that an operation made
    /// exactly one round trip, or none at all.
    #[derive(Debug, Default)]
    pub struct MockGateway {
        responses: Arc<Mutex<VecDeque<Result<MessageBundle, PortError>>>>,
        calls: AtomicU64,
    }

    impl MockGateway {
        /// Creates a mock with no scripted responses
        pub fn new() -> Self {
            Self::default()
        }

        /// Scripts the next response
        pub async fn push_response(&self, response: MessageBundle) {
            self.responses.lock().await.push_back(Ok(response));
        }

        /// Scripts the next call to fail
        pub async fn push_error(&self, error: PortError) {
            self.responses.lock().await.push_back(Err(error));
        }

        /// Number of outbound calls made so far
        pub fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl DomainPort for MockGateway {}

    #[async_trait]
    impl HealthCheckable for MockGateway {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-gateway".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: None,
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl ExchangeGateway for MockGateway {
        async fn exchange(&self, _bundle: &MessageBundle) -> Result<MessageBundle, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| {
                    Err(PortError::internal("mock gateway has no scripted response"))
                })
        }
    }
}
