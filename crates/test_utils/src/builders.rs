//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the fields they care about.

use chrono::NaiveDate;

use core_kernel::{Currency, InsurerId, Money, PatientId, ProviderId};
use domain_claims::{Claim, ClaimItem, ClaimType, Diagnosis};
use domain_coverage::PriorAuthorization;
use domain_exchange::{Communication, CommunicationPayload};

use crate::fixtures::{DateFixtures, MoneyFixtures, StringFixtures};

/// Builder for test claims
///
/// Defaults to a complete, sendable professional claim with one diagnosis
/// and one item line.
pub struct TestClaimBuilder {
    patient_id: PatientId,
    provider_id: ProviderId,
    insurer_id: InsurerId,
    claim_type: ClaimType,
    service_date: NaiveDate,
    currency: Currency,
    diagnoses: Vec<Diagnosis>,
    items: Vec<ClaimItem>,
}

impl Default for TestClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClaimBuilder {
    /// Creates a builder with complete defaults
    pub fn new() -> Self {
        Self {
            patient_id: PatientId::new(),
            provider_id: ProviderId::new(),
            insurer_id: InsurerId::new(),
            claim_type: ClaimType::Professional,
            service_date: DateFixtures::service_date(),
            currency: Currency::SAR,
            diagnoses: vec![Diagnosis::principal(StringFixtures::icd_code())],
            items: vec![ClaimItem::new(
                StringFixtures::service_code(),
                1,
                MoneyFixtures::consultation_fee(),
            )],
        }
    }

    /// Sets the patient reference
    pub fn with_patient(mut self, id: PatientId) -> Self {
        self.patient_id = id;
        self
    }

    /// Sets the provider reference
    pub fn with_provider(mut self, id: ProviderId) -> Self {
        self.provider_id = id;
        self
    }

    /// Sets the insurer reference
    pub fn with_insurer(mut self, id: InsurerId) -> Self {
        self.insurer_id = id;
        self
    }

    /// Sets the claim type
    pub fn with_claim_type(mut self, claim_type: ClaimType) -> Self {
        self.claim_type = claim_type;
        self
    }

    /// Sets the service date
    pub fn with_service_date(mut self, date: NaiveDate) -> Self {
        self.service_date = date;
        self
    }

    /// Replaces the diagnosis list
    pub fn with_diagnoses(mut self, diagnoses: Vec<Diagnosis>) -> Self {
        self.diagnoses = diagnoses;
        self
    }

    /// Replaces the item list
    pub fn with_items(mut self, items: Vec<ClaimItem>) -> Self {
        self.items = items;
        self
    }

    /// Adds an item line
    pub fn add_item(mut self, service_code: &str, quantity: u32, unit_price: Money) -> Self {
        self.items.push(ClaimItem::new(service_code, quantity, unit_price));
        self
    }

    /// Removes all diagnoses and items, producing an unsendable draft
    pub fn empty(mut self) -> Self {
        self.diagnoses.clear();
        self.items.clear();
        self
    }

    /// Builds the claim
    pub fn build(self) -> Claim {
        let mut claim = Claim::draft(
            self.patient_id,
            self.provider_id,
            self.insurer_id,
            self.claim_type,
            self.service_date,
            self.currency,
        );
        for diagnosis in self.diagnoses {
            claim.add_diagnosis(diagnosis);
        }
        for item in self.items {
            claim.add_item(item);
        }
        claim
    }
}

/// Builder for test prior authorizations
pub struct TestPriorAuthBuilder {
    patient_id: PatientId,
    provider_id: ProviderId,
    insurer_id: InsurerId,
    service_code: String,
    requested_amount: Money,
    description: Option<String>,
}

impl Default for TestPriorAuthBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPriorAuthBuilder {
    /// Creates a builder with complete defaults
    pub fn new() -> Self {
        Self {
            patient_id: PatientId::new(),
            provider_id: ProviderId::new(),
            insurer_id: InsurerId::new(),
            service_code: StringFixtures::dental_service_code().to_string(),
            requested_amount: MoneyFixtures::preauth_amount(),
            description: None,
        }
    }

    /// Sets the patient reference
    pub fn with_patient(mut self, id: PatientId) -> Self {
        self.patient_id = id;
        self
    }

    /// Sets the service code
    pub fn with_service_code(mut self, code: impl Into<String>) -> Self {
        self.service_code = code.into();
        self
    }

    /// Sets the requested amount
    pub fn with_requested_amount(mut self, amount: Money) -> Self {
        self.requested_amount = amount;
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builds the prior authorization
    pub fn build(self) -> PriorAuthorization {
        let mut auth = PriorAuthorization::draft(
            self.patient_id,
            self.provider_id,
            self.insurer_id,
            self.service_code,
            self.requested_amount,
        );
        auth.description = self.description;
        auth
    }
}

/// Builder for test communications
pub struct TestCommunicationBuilder {
    claim: Option<Claim>,
    payloads: Vec<CommunicationPayload>,
}

impl Default for TestCommunicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCommunicationBuilder {
    /// Creates a builder with one text payload
    pub fn new() -> Self {
        Self {
            claim: None,
            payloads: vec![CommunicationPayload::text("supporting documents attached")],
        }
    }

    /// Sets the parent claim
    pub fn for_claim(mut self, claim: Claim) -> Self {
        self.claim = Some(claim);
        self
    }

    /// Replaces the payload list
    pub fn with_payloads(mut self, payloads: Vec<CommunicationPayload>) -> Self {
        self.payloads = payloads;
        self
    }

    /// Builds an outbound communication
    pub fn build(self) -> Communication {
        let claim_id = self
            .claim
            .map(|c| c.id)
            .unwrap_or_else(core_kernel::ClaimId::new);
        Communication::outbound(claim_id, self.payloads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_claim_is_sendable() {
        let claim = TestClaimBuilder::new().build();
        assert!(claim.validate_for_submission().is_ok());
        assert!(claim.is_sendable());
    }

    #[test]
    fn test_empty_claim_is_not_sendable() {
        let claim = TestClaimBuilder::new().empty().build();
        assert!(claim.validate_for_submission().is_err());
    }

    #[test]
    fn test_default_prior_auth_is_sendable() {
        let auth = TestPriorAuthBuilder::new().build();
        assert!(auth.validate_for_submission().is_ok());
        assert!(auth.is_sendable());
    }

    #[test]
    fn test_communication_builder_links_claim() {
        let claim = TestClaimBuilder::new().build();
        let communication = TestCommunicationBuilder::new()
            .for_claim(claim.clone())
            .build();
        assert_eq!(communication.claim_id, claim.id);
        assert!(!communication.payloads.is_empty());
    }
}
