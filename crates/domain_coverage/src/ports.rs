//! Coverage Domain Ports

use async_trait::async_trait;

use core_kernel::{DomainPort, EligibilityId, PortError, PriorAuthId};

use crate::eligibility::EligibilityCheck;
use crate::prior_auth::PriorAuthorization;

/// Persistence port for eligibility checks and prior authorizations
#[async_trait]
pub trait CoverageStore: DomainPort {
    /// Persists a completed eligibility check
    async fn insert_eligibility(&self, check: &EligibilityCheck) -> Result<(), PortError>;

    /// Retrieves an eligibility check by id
    async fn get_eligibility(&self, id: EligibilityId) -> Result<EligibilityCheck, PortError>;

    /// Inserts a new prior authorization
    async fn insert_prior_auth(&self, auth: &PriorAuthorization) -> Result<(), PortError>;

    /// Retrieves a prior authorization by id
    async fn get_prior_auth(&self, id: PriorAuthId) -> Result<PriorAuthorization, PortError>;

    /// Writes the prior authorization row back
    async fn save_prior_auth(&self, auth: &PriorAuthorization) -> Result<(), PortError>;
}

/// In-memory mock adapter for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation of `CoverageStore`
    #[derive(Debug, Default)]
    pub struct MockCoverageStore {
        eligibility: Arc<RwLock<HashMap<EligibilityId, EligibilityCheck>>>,
        prior_auths: Arc<RwLock<HashMap<PriorAuthId, PriorAuthorization>>>,
    }

    impl MockCoverageStore {
        /// Creates an empty mock store
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockCoverageStore {}

    #[async_trait]
    impl CoverageStore for MockCoverageStore {
        async fn insert_eligibility(&self, check: &EligibilityCheck) -> Result<(), PortError> {
            self.eligibility.write().await.insert(check.id, check.clone());
            Ok(())
        }

        async fn get_eligibility(
            &self,
            id: EligibilityId,
        ) -> Result<EligibilityCheck, PortError> {
            self.eligibility
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("EligibilityCheck", id))
        }

        async fn insert_prior_auth(&self, auth: &PriorAuthorization) -> Result<(), PortError> {
            let mut auths = self.prior_auths.write().await;
            if auths.contains_key(&auth.id) {
                return Err(PortError::conflict(format!(
                    "prior authorization {} already exists",
                    auth.id
                )));
            }
            auths.insert(auth.id, auth.clone());
            Ok(())
        }

        async fn get_prior_auth(
            &self,
            id: PriorAuthId,
        ) -> Result<PriorAuthorization, PortError> {
            self.prior_auths
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("PriorAuthorization", id))
        }

        async fn save_prior_auth(&self, auth: &PriorAuthorization) -> Result<(), PortError> {
            let mut auths = self.prior_auths.write().await;
            if !auths.contains_key(&auth.id) {
                return Err(PortError::not_found("PriorAuthorization", auth.id));
            }
            auths.insert(auth.id, auth.clone());
            Ok(())
        }
    }
}
