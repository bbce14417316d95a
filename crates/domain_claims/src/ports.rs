//! Claims Domain Ports
//!
//! The `ClaimStore` trait is the persistence seam for claims. The submission
//! workflow loads a claim, mutates the aggregate, and saves it back; the
//! adapter decides how the row and its status history are written.

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, PortError};

use crate::claim::Claim;

/// Persistence port for claims
#[async_trait]
pub trait ClaimStore: DomainPort {
    /// Retrieves a claim by id
    async fn get(&self, id: ClaimId) -> Result<Claim, PortError>;

    /// Inserts a new claim
    async fn insert(&self, claim: &Claim) -> Result<(), PortError>;

    /// Writes the claim row back (last write wins on the status column)
    async fn save(&self, claim: &Claim) -> Result<(), PortError>;
}

/// In-memory mock adapter for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation of `ClaimStore`
    #[derive(Debug, Default)]
    pub struct MockClaimStore {
        claims: Arc<RwLock<HashMap<ClaimId, Claim>>>,
    }

    impl MockClaimStore {
        /// Creates an empty mock store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store with claims
        pub async fn with_claims(claims: Vec<Claim>) -> Self {
            let store = Self::new();
            for claim in claims {
                store.claims.write().await.insert(claim.id, claim);
            }
            store
        }
    }

    impl DomainPort for MockClaimStore {}

    #[async_trait]
    impl ClaimStore for MockClaimStore {
        async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.claims
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            if claims.contains_key(&claim.id) {
                return Err(PortError::conflict(format!(
                    "claim {} already exists",
                    claim.id
                )));
            }
            claims.insert(claim.id, claim.clone());
            Ok(())
        }

        async fn save(&self, claim: &Claim) -> Result<(), PortError> {
            let mut claims = self.claims.write().await;
            if !claims.contains_key(&claim.id) {
                return Err(PortError::not_found("Claim", claim.id));
            }
            claims.insert(claim.id, claim.clone());
            Ok(())
        }
    }
}
