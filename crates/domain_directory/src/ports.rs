//! Directory Domain Ports
//!
//! The `DirectoryStore` trait is what the exchange workflow uses to resolve
//! the parties a claim references before building an outbound bundle.
//! Adapters: PostgreSQL (infra_db) and an in-memory mock for tests.

use async_trait::async_trait;

use core_kernel::{DomainPort, InsurerId, PatientId, PortError, ProviderId};

use crate::insurer::Insurer;
use crate::patient::Patient;
use crate::provider::Provider;

/// Read access to the party records a claim references
#[async_trait]
pub trait DirectoryStore: DomainPort {
    /// Retrieves a patient by id
    async fn get_patient(&self, id: PatientId) -> Result<Patient, PortError>;

    /// Retrieves a provider by id
    async fn get_provider(&self, id: ProviderId) -> Result<Provider, PortError>;

    /// Retrieves an insurer by id
    async fn get_insurer(&self, id: InsurerId) -> Result<Insurer, PortError>;

    /// Persists a patient record
    async fn put_patient(&self, patient: &Patient) -> Result<(), PortError>;

    /// Persists a provider record
    async fn put_provider(&self, provider: &Provider) -> Result<(), PortError>;

    /// Persists an insurer record
    async fn put_insurer(&self, insurer: &Insurer) -> Result<(), PortError>;
}

/// In-memory mock adapter for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation of `DirectoryStore`
    #[derive(Debug, Default)]
    pub struct MockDirectoryStore {
        patients: Arc<RwLock<HashMap<PatientId, Patient>>>,
        providers: Arc<RwLock<HashMap<ProviderId, Provider>>>,
        insurers: Arc<RwLock<HashMap<InsurerId, Insurer>>>,
    }

    impl MockDirectoryStore {
        /// Creates an empty mock store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store with one of each party
        pub async fn with_parties(
            patient: Patient,
            provider: Provider,
            insurer: Insurer,
        ) -> Self {
            let store = Self::new();
            store.put_patient(&patient).await.unwrap();
            store.put_provider(&provider).await.unwrap();
            store.put_insurer(&insurer).await.unwrap();
            store
        }
    }

    impl DomainPort for MockDirectoryStore {}

    #[async_trait]
    impl DirectoryStore for MockDirectoryStore {
        async fn get_patient(&self, id: PatientId) -> Result<Patient, PortError> {
            self.patients
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Patient", id))
        }

        async fn get_provider(&self, id: ProviderId) -> Result<Provider, PortError> {
            self.providers
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Provider", id))
        }

        async fn get_insurer(&self, id: InsurerId) -> Result<Insurer, PortError> {
            self.insurers
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Insurer", id))
        }

        async fn put_patient(&self, patient: &Patient) -> Result<(), PortError> {
            self.patients.write().await.insert(patient.id, patient.clone());
            Ok(())
        }

        async fn put_provider(&self, provider: &Provider) -> Result<(), PortError> {
            self.providers.write().await.insert(provider.id, provider.clone());
            Ok(())
        }

        async fn put_insurer(&self, insurer: &Insurer) -> Result<(), PortError> {
            self.insurers.write().await.insert(insurer.id, insurer.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockDirectoryStore;
    use super::*;
    use crate::patient::Gender;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_mock_store_roundtrip() {
        let store = MockDirectoryStore::new();
        let patient = Patient::new(
            "1098765432",
            "Omar",
            "Al-Qahtani",
            NaiveDate::from_ymd_opt(1978, 11, 2).unwrap(),
            Gender::Male,
        );

        store.put_patient(&patient).await.unwrap();
        let loaded = store.get_patient(patient.id).await.unwrap();
        assert_eq!(loaded.national_id, patient.national_id);
    }

    #[tokio::test]
    async fn test_mock_store_not_found() {
        let store = MockDirectoryStore::new();
        let result = store.get_insurer(InsurerId::new()).await;
        assert!(result.unwrap_err().is_not_found());
    }
}
