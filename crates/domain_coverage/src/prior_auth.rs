//! Prior authorizations

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{InsurerId, Money, PatientId, PriorAuthId, ProviderId};
use crate::error::CoverageError;

/// Prior authorization status
///
/// Mirrors the claim lifecycle, with partial approval as an extra
/// adjudicated outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthStatus {
    /// Entered locally, not yet submitted
    Draft,
    /// Accepted by the clearinghouse, awaiting a decision
    Queued,
    /// Approved as requested
    Approved,
    /// Approved for less than the requested amount
    PartiallyApproved,
    /// Denied
    Denied,
    /// Submission or adjudication failed
    Error,
    /// Withdrawn before submission
    Cancelled,
}

impl AuthStatus {
    /// Wire-format code used in responses and persistence
    pub fn code(&self) -> &'static str {
        match self {
            AuthStatus::Draft => "draft",
            AuthStatus::Queued => "queued",
            AuthStatus::Approved => "approved",
            AuthStatus::PartiallyApproved => "partially_approved",
            AuthStatus::Denied => "denied",
            AuthStatus::Error => "error",
            AuthStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a persisted status code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "draft" => Some(AuthStatus::Draft),
            "queued" => Some(AuthStatus::Queued),
            "approved" => Some(AuthStatus::Approved),
            "partially_approved" => Some(AuthStatus::PartiallyApproved),
            "denied" => Some(AuthStatus::Denied),
            "error" => Some(AuthStatus::Error),
            "cancelled" => Some(AuthStatus::Cancelled),
            _ => None,
        }
    }
}

/// A pre-approval request for a planned service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorAuthorization {
    /// Unique identifier
    pub id: PriorAuthId,
    /// Patient the service is planned for
    pub patient_id: PatientId,
    /// Provider planning to render the service
    pub provider_id: ProviderId,
    /// Insurer being asked to pre-approve
    pub insurer_id: InsurerId,
    /// Service or procedure code
    pub service_code: String,
    /// Human-readable description
    pub description: Option<String>,
    /// Amount requested
    pub requested_amount: Money,
    /// Status
    pub status: AuthStatus,
    /// Authorization number issued on approval
    pub auth_number: Option<String>,
    /// Amount approved, possibly below the request
    pub approved_amount: Option<Money>,
    /// Approval expiry date
    pub expiry_date: Option<NaiveDate>,
    /// Denial reason text, if denied
    pub denial_reason: Option<String>,
    /// When the request was last submitted
    pub submitted_at: Option<DateTime<Utc>>,
    /// Raw body of the last clearinghouse response
    pub last_response: Option<serde_json::Value>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl PriorAuthorization {
    /// Creates a new draft request
    pub fn draft(
        patient_id: PatientId,
        provider_id: ProviderId,
        insurer_id: InsurerId,
        service_code: impl Into<String>,
        requested_amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PriorAuthId::new_v7(),
            patient_id,
            provider_id,
            insurer_id,
            service_code: service_code.into(),
            description: None,
            requested_amount,
            status: AuthStatus::Draft,
            auth_number: None,
            approved_amount: None,
            expiry_date: None,
            denial_reason: None,
            submitted_at: None,
            last_response: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Updates the status, rejecting illegal transitions
    pub fn update_status(&mut self, status: AuthStatus) -> Result<(), CoverageError> {
        if !self.can_transition_to(status) {
            return Err(CoverageError::InvalidStatusTransition {
                from: self.status.code().to_string(),
                to: status.code().to_string(),
            });
        }
        self.status = status;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records a submission round trip
    pub fn record_submission(&mut self, response: serde_json::Value) {
        self.submitted_at = Some(Utc::now());
        self.last_response = Some(response);
        self.updated_at = Utc::now();
    }

    /// Records a follow-up response without re-stamping the submission time
    pub fn record_response(&mut self, response: serde_json::Value) {
        self.last_response = Some(response);
        self.updated_at = Utc::now();
    }

    /// Records an approval decision
    pub fn record_approval(
        &mut self,
        auth_number: impl Into<String>,
        approved_amount: Money,
        expiry_date: Option<NaiveDate>,
    ) -> Result<(), CoverageError> {
        let status = if approved_amount.amount() < self.requested_amount.amount() {
            AuthStatus::PartiallyApproved
        } else {
            AuthStatus::Approved
        };
        self.update_status(status)?;
        self.auth_number = Some(auth_number.into());
        self.approved_amount = Some(approved_amount);
        self.expiry_date = expiry_date;
        Ok(())
    }

    /// True when the request may be submitted
    pub fn is_sendable(&self) -> bool {
        matches!(self.status, AuthStatus::Draft | AuthStatus::Error)
    }

    /// True when polling can advance the request
    pub fn is_poll_eligible(&self) -> bool {
        self.status == AuthStatus::Queued
    }

    /// Validates fields required for submission
    pub fn validate_for_submission(&self) -> Result<(), CoverageError> {
        if self.service_code.trim().is_empty() {
            return Err(CoverageError::MissingField("service_code"));
        }
        if !self.requested_amount.is_positive() {
            return Err(CoverageError::NonPositiveAmount);
        }
        Ok(())
    }

    fn can_transition_to(&self, target: AuthStatus) -> bool {
        use AuthStatus::*;
        matches!(
            (self.status, target),
            (Draft, Queued) |
            (Draft, Error) |
            (Draft, Cancelled) |
            (Error, Queued) |
            (Error, Error) |
            (Queued, Queued) |
            (Queued, Approved) |
            (Queued, PartiallyApproved) |
            (Queued, Denied) |
            (Queued, Error)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn draft_auth() -> PriorAuthorization {
        PriorAuthorization::draft(
            PatientId::new(),
            ProviderId::new(),
            InsurerId::new(),
            "D2740",
            Money::new(dec!(1500), Currency::SAR),
        )
    }

    #[test]
    fn test_partial_approval_below_requested_amount() {
        let mut auth = draft_auth();
        auth.update_status(AuthStatus::Queued).unwrap();
        auth.record_approval("AUTH-99", Money::new(dec!(900), Currency::SAR), None)
            .unwrap();
        assert_eq!(auth.status, AuthStatus::PartiallyApproved);
    }

    #[test]
    fn test_full_approval_at_requested_amount() {
        let mut auth = draft_auth();
        auth.update_status(AuthStatus::Queued).unwrap();
        auth.record_approval("AUTH-100", Money::new(dec!(1500), Currency::SAR), None)
            .unwrap();
        assert_eq!(auth.status, AuthStatus::Approved);
        assert_eq!(auth.auth_number.as_deref(), Some("AUTH-100"));
    }

    #[test]
    fn test_draft_cannot_be_denied_directly() {
        let mut auth = draft_auth();
        assert!(auth.update_status(AuthStatus::Denied).is_err());
    }

    #[test]
    fn test_validation_rejects_blank_service_code() {
        let mut auth = draft_auth();
        auth.service_code = "  ".to_string();
        assert!(matches!(
            auth.validate_for_submission(),
            Err(CoverageError::MissingField("service_code"))
        ));
    }
}
