//! Claim aggregate

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ClaimItemId, Currency, InsurerId, Money, PatientId, ProviderId};
use crate::error::ClaimError;

/// Claim status
///
/// Poll results always land in one of `Queued`, `Approved`, `Denied`,
/// or `Error`; `Draft` and `Cancelled` exist only locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Entered locally, not yet submitted
    Draft,
    /// Accepted by the clearinghouse, awaiting adjudication
    Queued,
    /// Adjudicated in the provider's favor
    Approved,
    /// Adjudicated against the provider
    Denied,
    /// Submission or adjudication failed
    Error,
    /// Withdrawn before submission
    Cancelled,
}

impl ClaimStatus {
    /// Wire-format code used in responses and persistence
    pub fn code(&self) -> &'static str {
        match self {
            ClaimStatus::Draft => "draft",
            ClaimStatus::Queued => "queued",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Denied => "denied",
            ClaimStatus::Error => "error",
            ClaimStatus::Cancelled => "cancelled",
        }
    }

    /// Parses a persisted status code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "draft" => Some(ClaimStatus::Draft),
            "queued" => Some(ClaimStatus::Queued),
            "approved" => Some(ClaimStatus::Approved),
            "denied" => Some(ClaimStatus::Denied),
            "error" => Some(ClaimStatus::Error),
            "cancelled" => Some(ClaimStatus::Cancelled),
            _ => None,
        }
    }
}

/// Type of claim
///
/// Oral and vision claims carry the dental and eye approval flows; the
/// bundle builder emits the matching claim subtype code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Institutional,
    Professional,
    Oral,
    Vision,
    Pharmacy,
}

impl ClaimType {
    /// Wire-format subtype code
    pub fn code(&self) -> &'static str {
        match self {
            ClaimType::Institutional => "institutional",
            ClaimType::Professional => "professional",
            ClaimType::Oral => "oral",
            ClaimType::Vision => "vision",
            ClaimType::Pharmacy => "pharmacy",
        }
    }

    /// Parses a persisted subtype code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "institutional" => Some(ClaimType::Institutional),
            "professional" => Some(ClaimType::Professional),
            "oral" => Some(ClaimType::Oral),
            "vision" => Some(ClaimType::Vision),
            "pharmacy" => Some(ClaimType::Pharmacy),
            _ => None,
        }
    }
}

/// Role a diagnosis plays on the claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosisKind {
    Principal,
    Secondary,
    Admitting,
    Discharge,
}

impl DiagnosisKind {
    /// Wire-format code
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosisKind::Principal => "principal",
            DiagnosisKind::Secondary => "secondary",
            DiagnosisKind::Admitting => "admitting",
            DiagnosisKind::Discharge => "discharge",
        }
    }

    /// Parses a persisted code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "principal" => Some(DiagnosisKind::Principal),
            "secondary" => Some(DiagnosisKind::Secondary),
            "admitting" => Some(DiagnosisKind::Admitting),
            "discharge" => Some(DiagnosisKind::Discharge),
            _ => None,
        }
    }
}

/// A coded diagnosis attached to a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// ICD-10 code
    pub code: String,
    /// Role on the claim
    pub kind: DiagnosisKind,
}

impl Diagnosis {
    pub fn principal(code: impl Into<String>) -> Self {
        Self { code: code.into(), kind: DiagnosisKind::Principal }
    }

    pub fn secondary(code: impl Into<String>) -> Self {
        Self { code: code.into(), kind: DiagnosisKind::Secondary }
    }
}

/// A billed service line on a claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimItem {
    /// Unique identifier
    pub id: ClaimItemId,
    /// Service or procedure code
    pub service_code: String,
    /// Human-readable description
    pub description: Option<String>,
    /// Units billed
    pub quantity: u32,
    /// Price per unit
    pub unit_price: Money,
}

impl ClaimItem {
    /// Creates a new item line
    pub fn new(service_code: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            id: ClaimItemId::new_v7(),
            service_code: service_code.into(),
            description: None,
            quantity,
            unit_price,
        }
    }

    /// Net amount for the line (quantity * unit price)
    pub fn net(&self) -> Money {
        let quantity = rust_decimal::Decimal::from(self.quantity);
        Money::new(self.unit_price.amount() * quantity, self.unit_price.currency())
    }
}

/// A healthcare claim against an insurer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Claim number
    pub claim_number: String,
    /// Patient who received care
    pub patient_id: PatientId,
    /// Provider who rendered care
    pub provider_id: ProviderId,
    /// Insurer the claim is billed to
    pub insurer_id: InsurerId,
    /// Claim type
    pub claim_type: ClaimType,
    /// Status
    pub status: ClaimStatus,
    /// Date of service
    pub service_date: NaiveDate,
    /// Currency of all item amounts
    pub currency: Currency,
    /// Diagnoses
    pub diagnoses: Vec<Diagnosis>,
    /// Billed service lines
    pub items: Vec<ClaimItem>,
    /// When the claim was last submitted
    pub submitted_at: Option<DateTime<Utc>>,
    /// Raw body of the last clearinghouse response
    pub last_response: Option<serde_json::Value>,
    /// Denial or error text from the last adjudication, if any
    pub disposition_note: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Creates a new draft claim
    pub fn draft(
        patient_id: PatientId,
        provider_id: ProviderId,
        insurer_id: InsurerId,
        claim_type: ClaimType,
        service_date: NaiveDate,
        currency: Currency,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ClaimId::new_v7(),
            claim_number: generate_claim_number(),
            patient_id,
            provider_id,
            insurer_id,
            claim_type,
            status: ClaimStatus::Draft,
            service_date,
            currency,
            diagnoses: Vec::new(),
            items: Vec::new(),
            submitted_at: None,
            last_response: None,
            disposition_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a billed service line
    pub fn add_item(&mut self, item: ClaimItem) {
        self.items.push(item);
        self.updated_at = Utc::now();
    }

    /// Adds a diagnosis
    pub fn add_diagnosis(&mut self, diagnosis: Diagnosis) {
        self.diagnoses.push(diagnosis);
        self.updated_at = Utc::now();
    }

    /// Total billed amount across all items
    pub fn total(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(self.currency), |acc, item| acc + item.net())
    }

    /// Updates the status, rejecting illegal transitions
    pub fn update_status(&mut self, status: ClaimStatus) -> Result<(), ClaimError> {
        if !self.can_transition_to(status) {
            return Err(ClaimError::InvalidStatusTransition {
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

    /// True when the claim may be submitted to the clearinghouse
    pub fn is_sendable(&self) -> bool {
        matches!(self.status, ClaimStatus::Draft | ClaimStatus::Error)
    }

    /// True when polling can advance the claim
    pub fn is_poll_eligible(&self) -> bool {
        self.status == ClaimStatus::Queued
    }

    /// Validates the claim-level fields required for submission
    pub fn validate_for_submission(&self) -> Result<(), ClaimError> {
        if self.items.is_empty() {
            return Err(ClaimError::MissingField("items"));
        }
        if self.diagnoses.is_empty() {
            return Err(ClaimError::MissingField("diagnoses"));
        }
        if !self.total().is_positive() {
            return Err(ClaimError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Checks if transition is valid
    fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Draft, Queued) |
            (Draft, Error) |
            (Draft, Cancelled) |
            (Error, Queued) |
            (Error, Error) |
            (Queued, Queued) |
            (Queued, Approved) |
            (Queued, Denied) |
            (Queued, Error)
        )
    }
}

fn generate_claim_number() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("CLM-{}", duration.as_millis() % 10_000_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft_claim() -> Claim {
        Claim::draft(
            PatientId::new(),
            ProviderId::new(),
            InsurerId::new(),
            ClaimType::Professional,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            Currency::SAR,
        )
    }

    #[test]
    fn test_draft_to_queued_is_legal() {
        let mut claim = draft_claim();
        claim.update_status(ClaimStatus::Queued).unwrap();
        assert_eq!(claim.status, ClaimStatus::Queued);
    }

    #[test]
    fn test_draft_cannot_be_approved_directly() {
        let mut claim = draft_claim();
        let result = claim.update_status(ClaimStatus::Approved);
        assert!(matches!(
            result,
            Err(ClaimError::InvalidStatusTransition { .. })
        ));
        assert_eq!(claim.status, ClaimStatus::Draft);
    }

    #[test]
    fn test_error_claim_is_sendable_again() {
        let mut claim = draft_claim();
        claim.update_status(ClaimStatus::Error).unwrap();
        assert!(claim.is_sendable());
        claim.update_status(ClaimStatus::Queued).unwrap();
        assert_eq!(claim.status, ClaimStatus::Queued);
    }

    #[test]
    fn test_adjudicated_claim_is_not_poll_eligible() {
        let mut claim = draft_claim();
        claim.update_status(ClaimStatus::Queued).unwrap();
        claim.update_status(ClaimStatus::Approved).unwrap();
        assert!(!claim.is_poll_eligible());
    }

    #[test]
    fn test_total_sums_item_lines() {
        let mut claim = draft_claim();
        claim.add_item(ClaimItem::new(
            "83036",
            2,
            Money::new(dec!(120.50), Currency::SAR),
        ));
        claim.add_item(ClaimItem::new(
            "99213",
            1,
            Money::new(dec!(80), Currency::SAR),
        ));
        assert_eq!(claim.total().amount(), dec!(321));
    }

    #[test]
    fn test_validation_requires_items_and_diagnoses() {
        let mut claim = draft_claim();
        assert!(matches!(
            claim.validate_for_submission(),
            Err(ClaimError::MissingField("items"))
        ));

        claim.add_item(ClaimItem::new(
            "99213",
            1,
            Money::new(dec!(80), Currency::SAR),
        ));
        assert!(matches!(
            claim.validate_for_submission(),
            Err(ClaimError::MissingField("diagnoses"))
        ));

        claim.add_diagnosis(Diagnosis::principal("E11.9"));
        assert!(claim.validate_for_submission().is_ok());
    }

    #[test]
    fn test_zero_amount_claim_rejected() {
        let mut claim = draft_claim();
        claim.add_item(ClaimItem::new("99213", 0, Money::new(dec!(80), Currency::SAR)));
        claim.add_diagnosis(Diagnosis::principal("E11.9"));
        assert!(matches!(
            claim.validate_for_submission(),
            Err(ClaimError::NonPositiveAmount)
        ));
    }

    mod transition_properties {
        use super::*;
        use proptest::prelude::*;

        fn status_strategy() -> impl Strategy<Value = ClaimStatus> {
            prop_oneof![
                Just(ClaimStatus::Draft),
                Just(ClaimStatus::Queued),
                Just(ClaimStatus::Approved),
                Just(ClaimStatus::Denied),
                Just(ClaimStatus::Error),
                Just(ClaimStatus::Cancelled),
            ]
        }

        proptest! {
            /// An update either moves to the target or leaves the claim untouched.
            #[test]
            fn prop_update_status_is_atomic(
                from in status_strategy(),
                to in status_strategy(),
            ) {
                let mut claim = draft_claim();
                claim.status = from;

                match claim.update_status(to) {
                    Ok(()) => prop_assert_eq!(claim.status, to),
                    Err(_) => prop_assert_eq!(claim.status, from),
                }
            }

            /// Adjudicated and cancelled claims never transition anywhere.
            #[test]
            fn prop_terminal_statuses_stay_terminal(to in status_strategy()) {
                for terminal in [ClaimStatus::Approved, ClaimStatus::Denied, ClaimStatus::Cancelled] {
                    let mut claim = draft_claim();
                    claim.status = terminal;
                    prop_assert!(claim.update_status(to).is_err());
                }
            }
        }
    }
}
