//! Communication records
//!
//! Free-form payload exchanges attached to a claim: outbound rows are
//! created when the provider sends information, inbound rows when polling
//! discovers a request from the payer. Acknowledgment state advances only
//! through poll.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, CommunicationId, DomainPort, PortError};

/// Which side initiated the communication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    /// Wire-format code
    pub fn code(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }

    /// Parses a persisted code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "inbound" => Some(Direction::Inbound),
            "outbound" => Some(Direction::Outbound),
            _ => None,
        }
    }
}

/// Acknowledgment state of a communication
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    /// Sent (or received) and awaiting acknowledgment
    Queued,
    /// Acknowledged by the other party
    Acknowledged,
    /// The exchange failed
    Error,
}

impl AckStatus {
    /// Wire-format code
    pub fn code(&self) -> &'static str {
        match self {
            AckStatus::Queued => "queued",
            AckStatus::Acknowledged => "acknowledged",
            AckStatus::Error => "error",
        }
    }

    /// Parses a persisted code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "queued" => Some(AckStatus::Queued),
            "acknowledged" => Some(AckStatus::Acknowledged),
            "error" => Some(AckStatus::Error),
            _ => None,
        }
    }
}

/// One payload element of a communication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunicationPayload {
    /// Text content
    pub content: Option<String>,
    /// Attachment URL
    pub attachment_url: Option<String>,
    /// Attachment title
    pub attachment_title: Option<String>,
}

impl CommunicationPayload {
    /// A plain-text payload
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            attachment_url: None,
            attachment_title: None,
        }
    }

    /// An attachment payload
    pub fn attachment(url: impl Into<String>, title: Option<String>) -> Self {
        Self {
            content: None,
            attachment_url: Some(url.into()),
            attachment_title: title,
        }
    }

    /// True when the payload carries neither text nor an attachment
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.attachment_url.is_none()
    }
}

/// A communication attached to a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Communication {
    /// Unique identifier
    pub id: CommunicationId,
    /// Parent claim
    pub claim_id: ClaimId,
    /// Which side initiated it
    pub direction: Direction,
    /// Payload list
    pub payloads: Vec<CommunicationPayload>,
    /// Acknowledgment state
    pub ack_status: AckStatus,
    /// External identifier, when assigned by the clearinghouse
    pub reference: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Communication {
    /// Creates an outbound communication awaiting acknowledgment
    pub fn outbound(claim_id: ClaimId, payloads: Vec<CommunicationPayload>) -> Self {
        Self {
            id: CommunicationId::new_v7(),
            claim_id,
            direction: Direction::Outbound,
            payloads,
            ack_status: AckStatus::Queued,
            reference: None,
            created_at: Utc::now(),
        }
    }

    /// Creates an inbound communication request discovered by polling
    pub fn inbound(
        claim_id: ClaimId,
        reference: impl Into<String>,
        payloads: Vec<CommunicationPayload>,
    ) -> Self {
        Self {
            id: CommunicationId::new_v7(),
            claim_id,
            direction: Direction::Inbound,
            payloads,
            ack_status: AckStatus::Queued,
            reference: Some(reference.into()),
            created_at: Utc::now(),
        }
    }
}

/// Persistence port for communications
#[async_trait]
pub trait CommunicationStore: DomainPort {
    /// Inserts a new communication row
    async fn insert(&self, communication: &Communication) -> Result<(), PortError>;

    /// Writes a communication row back
    async fn save(&self, communication: &Communication) -> Result<(), PortError>;

    /// Lists communications for a claim in creation order
    async fn list_for_claim(&self, claim_id: ClaimId) -> Result<Vec<Communication>, PortError>;
}

/// In-memory mock adapter for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory implementation of `CommunicationStore`
    #[derive(Debug, Default)]
    pub struct MockCommunicationStore {
        rows: Arc<RwLock<HashMap<ClaimId, Vec<Communication>>>>,
    }

    impl MockCommunicationStore {
        /// Creates an empty mock store
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl DomainPort for MockCommunicationStore {}

    #[async_trait]
    impl CommunicationStore for MockCommunicationStore {
        async fn insert(&self, communication: &Communication) -> Result<(), PortError> {
            let mut rows = self.rows.write().await;
            let list = rows.entry(communication.claim_id).or_default();
            if list.iter().any(|c| c.id == communication.id) {
                return Err(PortError::conflict(format!(
                    "communication {} already exists",
                    communication.id
                )));
            }
            list.push(communication.clone());
            Ok(())
        }

        async fn save(&self, communication: &Communication) -> Result<(), PortError> {
            let mut rows = self.rows.write().await;
            let list = rows
                .get_mut(&communication.claim_id)
                .ok_or_else(|| PortError::not_found("Communication", communication.id))?;
            let slot = list
                .iter_mut()
                .find(|c| c.id == communication.id)
                .ok_or_else(|| PortError::not_found("Communication", communication.id))?;
            *slot = communication.clone();
            Ok(())
        }

        async fn list_for_claim(
            &self,
            claim_id: ClaimId,
        ) -> Result<Vec<Communication>, PortError> {
            Ok(self
                .rows
                .read()
                .await
                .get(&claim_id)
                .cloned()
                .unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockCommunicationStore;
    use super::*;

    #[tokio::test]
    async fn test_listing_preserves_creation_order() {
        let store = MockCommunicationStore::new();
        let claim_id = ClaimId::new();

        let first = Communication::outbound(claim_id, vec![CommunicationPayload::text("one")]);
        let second = Communication::outbound(claim_id, vec![CommunicationPayload::text("two")]);
        store.insert(&first).await.unwrap();
        store.insert(&second).await.unwrap();

        let listed = store.list_for_claim(claim_id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }

    #[tokio::test]
    async fn test_save_updates_ack_status() {
        let store = MockCommunicationStore::new();
        let claim_id = ClaimId::new();

        let mut comm = Communication::outbound(claim_id, vec![CommunicationPayload::text("x")]);
        store.insert(&comm).await.unwrap();

        comm.ack_status = AckStatus::Acknowledged;
        store.save(&comm).await.unwrap();

        let listed = store.list_for_claim(claim_id).await.unwrap();
        assert_eq!(listed[0].ack_status, AckStatus::Acknowledged);
    }
}
