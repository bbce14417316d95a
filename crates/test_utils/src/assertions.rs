//! Custom assertion helpers for domain types

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_exchange::{MessageBundle, Resource};

/// Asserts a money value equals the expected decimal amount
///
/// # Panics
///
/// Panics with a descriptive message on mismatch.
pub fn assert_money_eq(actual: Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "expected {} {}, got {}",
        expected,
        actual.currency(),
        actual
    );
}

/// Returns how many entries of the given resource type a bundle carries
pub fn count_resources(bundle: &MessageBundle, resource_type: &str) -> usize {
    bundle
        .resources()
        .filter(|r| name_of(r) == resource_type)
        .count()
}

/// Asserts a bundle carries exactly `expected` entries of a resource type
pub fn assert_resource_count(bundle: &MessageBundle, resource_type: &str, expected: usize) {
    let actual = count_resources(bundle, resource_type);
    assert_eq!(
        actual, expected,
        "expected {} {} entries, found {}",
        expected, resource_type, actual
    );
}

fn name_of(resource: &Resource) -> &'static str {
    match resource {
        Resource::MessageHeader(_) => "MessageHeader",
        Resource::Claim(_) => "Claim",
        Resource::ClaimResponse(_) => "ClaimResponse",
        Resource::Patient(_) => "Patient",
        Resource::Organization(_) => "Organization",
        Resource::Coverage(_) => "Coverage",
        Resource::CoverageEligibilityRequest(_) => "CoverageEligibilityRequest",
        Resource::CoverageEligibilityResponse(_) => "CoverageEligibilityResponse",
        Resource::Communication(_) => "Communication",
        Resource::CommunicationRequest(_) => "CommunicationRequest",
        Resource::Task(_) => "Task",
        Resource::OperationOutcome(_) => "OperationOutcome",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::TestClaimBuilder;
    use crate::fixtures::{MoneyFixtures, PartyFixtures};
    use domain_exchange::builder::claim_message;
    use rust_decimal_macros::dec;

    #[test]
    fn test_resource_counting_on_built_bundle() {
        let patient = PartyFixtures::patient();
        let provider = PartyFixtures::provider();
        let insurer = PartyFixtures::insurer();
        let claim = TestClaimBuilder::new()
            .with_patient(patient.id)
            .with_provider(provider.id)
            .with_insurer(insurer.id)
            .build();

        let bundle = claim_message(&claim, &patient, &provider, &insurer).unwrap();

        assert_resource_count(&bundle, "MessageHeader", 1);
        assert_resource_count(&bundle, "Claim", 1);
        assert_resource_count(&bundle, "Patient", 1);
        assert_resource_count(&bundle, "Organization", 2);
        assert_resource_count(&bundle, "Coverage", 1);
        assert_resource_count(&bundle, "OperationOutcome", 0);
    }

    #[test]
    fn test_money_assertion() {
        assert_money_eq(MoneyFixtures::consultation_fee(), dec!(250));
    }
}
