//! Coverage DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_coverage::{EligibilityCheck, PriorAuthorization};

#[derive(Debug, Deserialize)]
pub struct EligibilityRequest {
    pub patient_id: Uuid,
    pub provider_id: Uuid,
    pub insurer_id: Uuid,
    pub service_date: NaiveDate,
    /// "benefits" | "discovery" | "validation"
    pub purpose: String,
}

#[derive(Debug, Serialize)]
pub struct EligibilityBody {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub insurer_id: Uuid,
    pub service_date: NaiveDate,
    pub purpose: String,
    pub eligible: Option<bool>,
    pub site_eligibility: Option<String>,
    pub benefit_notes: Vec<String>,
    pub checked_at: Option<DateTime<Utc>>,
}

impl From<EligibilityCheck> for EligibilityBody {
    fn from(check: EligibilityCheck) -> Self {
        let (eligible, site_eligibility, benefit_notes) = match check.outcome {
            Some(outcome) => (
                Some(outcome.eligible),
                outcome.site_eligibility,
                outcome.benefit_notes,
            ),
            None => (None, None, Vec::new()),
        };
        Self {
            id: check.id.into_uuid(),
            patient_id: check.patient_id.into_uuid(),
            insurer_id: check.insurer_id.into_uuid(),
            service_date: check.service_date,
            purpose: check.purpose.code().to_string(),
            eligible,
            site_eligibility,
            benefit_notes,
            checked_at: check.checked_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePriorAuthRequest {
    pub patient_id: Uuid,
    pub provider_id: Uuid,
    pub insurer_id: Uuid,
    #[validate(length(min = 1, message = "service_code is required"))]
    pub service_code: String,
    pub description: Option<String>,
    pub requested_amount: Decimal,
    /// ISO 4217 code, e.g. "SAR"
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct PriorAuthBody {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub provider_id: Uuid,
    pub insurer_id: Uuid,
    pub service_code: String,
    pub description: Option<String>,
    pub requested_amount: Decimal,
    pub currency: String,
    pub status: String,
    pub auth_number: Option<String>,
    pub approved_amount: Option<Decimal>,
    pub expiry_date: Option<NaiveDate>,
    pub denial_reason: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<PriorAuthorization> for PriorAuthBody {
    fn from(auth: PriorAuthorization) -> Self {
        Self {
            id: auth.id.into_uuid(),
            patient_id: auth.patient_id.into_uuid(),
            provider_id: auth.provider_id.into_uuid(),
            insurer_id: auth.insurer_id.into_uuid(),
            service_code: auth.service_code.clone(),
            description: auth.description.clone(),
            requested_amount: auth.requested_amount.amount(),
            currency: auth.requested_amount.currency().code().to_string(),
            status: auth.status.code().to_string(),
            auth_number: auth.auth_number.clone(),
            approved_amount: auth.approved_amount.map(|m| m.amount()),
            expiry_date: auth.expiry_date,
            denial_reason: auth.denial_reason.clone(),
            submitted_at: auth.submitted_at,
            created_at: auth.created_at,
        }
    }
}
