//! Claim DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use domain_claims::Claim;

#[derive(Debug, Serialize)]
pub struct ClaimBody {
    pub id: Uuid,
    pub claim_number: String,
    pub patient_id: Uuid,
    pub provider_id: Uuid,
    pub insurer_id: Uuid,
    pub claim_type: String,
    pub status: String,
    pub service_date: NaiveDate,
    pub total: Decimal,
    pub currency: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub disposition_note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Claim> for ClaimBody {
    fn from(claim: Claim) -> Self {
        Self {
            id: claim.id.into_uuid(),
            claim_number: claim.claim_number.clone(),
            patient_id: claim.patient_id.into_uuid(),
            provider_id: claim.provider_id.into_uuid(),
            insurer_id: claim.insurer_id.into_uuid(),
            claim_type: claim.claim_type.code().to_string(),
            status: claim.status.code().to_string(),
            service_date: claim.service_date,
            total: claim.total().amount(),
            currency: claim.currency.code().to_string(),
            submitted_at: claim.submitted_at,
            disposition_note: claim.disposition_note,
            created_at: claim.created_at,
        }
    }
}
