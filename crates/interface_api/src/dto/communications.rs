//! Communication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_exchange::{Communication, CommunicationPayload};

#[derive(Debug, Deserialize, Validate)]
pub struct SendCommunicationRequest {
    /// Payload list; at least one element is required
    #[validate(length(min = 1, message = "at least one payload is required"))]
    pub payloads: Vec<PayloadBody>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PayloadBody {
    pub content: Option<String>,
    pub attachment_url: Option<String>,
    pub attachment_title: Option<String>,
}

impl From<PayloadBody> for CommunicationPayload {
    fn from(body: PayloadBody) -> Self {
        CommunicationPayload {
            content: body.content,
            attachment_url: body.attachment_url,
            attachment_title: body.attachment_title,
        }
    }
}

impl From<&CommunicationPayload> for PayloadBody {
    fn from(payload: &CommunicationPayload) -> Self {
        PayloadBody {
            content: payload.content.clone(),
            attachment_url: payload.attachment_url.clone(),
            attachment_title: payload.attachment_title.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommunicationBody {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub direction: String,
    pub ack_status: String,
    pub reference: Option<String>,
    pub payloads: Vec<PayloadBody>,
    pub created_at: DateTime<Utc>,
}

impl From<Communication> for CommunicationBody {
    fn from(communication: Communication) -> Self {
        Self {
            id: communication.id.into_uuid(),
            claim_id: communication.claim_id.into_uuid(),
            direction: communication.direction.code().to_string(),
            ack_status: communication.ack_status.code().to_string(),
            reference: communication.reference.clone(),
            payloads: communication.payloads.iter().map(PayloadBody::from).collect(),
            created_at: communication.created_at,
        }
    }
}
