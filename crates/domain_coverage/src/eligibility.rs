//! Eligibility checks

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{EligibilityId, InsurerId, PatientId, ProviderId};

/// Why the eligibility check is being made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityPurpose {
    /// Full benefit breakdown
    Benefits,
    /// Discover which policies cover the patient
    Discovery,
    /// Confirm coverage is in force
    Validation,
}

impl EligibilityPurpose {
    /// Wire-format code
    pub fn code(&self) -> &'static str {
        match self {
            EligibilityPurpose::Benefits => "benefits",
            EligibilityPurpose::Discovery => "discovery",
            EligibilityPurpose::Validation => "validation",
        }
    }

    /// Parses a persisted code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "benefits" => Some(EligibilityPurpose::Benefits),
            "discovery" => Some(EligibilityPurpose::Discovery),
            "validation" => Some(EligibilityPurpose::Validation),
            _ => None,
        }
    }
}

/// What the insurer answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityOutcome {
    /// Whether the patient is covered for the service date
    pub eligible: bool,
    /// Site eligibility string returned by the payer
    pub site_eligibility: Option<String>,
    /// Free-text benefit notes
    pub benefit_notes: Vec<String>,
}

/// One eligibility round trip and its recorded outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityCheck {
    /// Unique identifier
    pub id: EligibilityId,
    /// Patient being checked
    pub patient_id: PatientId,
    /// Provider planning to render care
    pub provider_id: ProviderId,
    /// Insurer being asked
    pub insurer_id: InsurerId,
    /// Date care is planned for
    pub service_date: NaiveDate,
    /// Purpose of the check
    pub purpose: EligibilityPurpose,
    /// Outcome, once the round trip completes
    pub outcome: Option<EligibilityOutcome>,
    /// When the round trip completed
    pub checked_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl EligibilityCheck {
    /// Creates a pending check
    pub fn new(
        patient_id: PatientId,
        provider_id: ProviderId,
        insurer_id: InsurerId,
        service_date: NaiveDate,
        purpose: EligibilityPurpose,
    ) -> Self {
        Self {
            id: EligibilityId::new_v7(),
            patient_id,
            provider_id,
            insurer_id,
            service_date,
            purpose,
            outcome: None,
            checked_at: None,
            created_at: Utc::now(),
        }
    }

    /// Records the insurer's answer
    pub fn record_outcome(&mut self, outcome: EligibilityOutcome) {
        self.outcome = Some(outcome);
        self.checked_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_recording_stamps_checked_at() {
        let mut check = EligibilityCheck::new(
            PatientId::new(),
            ProviderId::new(),
            InsurerId::new(),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
            EligibilityPurpose::Validation,
        );
        assert!(check.checked_at.is_none());

        check.record_outcome(EligibilityOutcome {
            eligible: true,
            site_eligibility: Some("eligible".to_string()),
            benefit_notes: vec![],
        });
        assert!(check.checked_at.is_some());
        assert!(check.outcome.as_ref().unwrap().eligible);
    }
}
