//! Bundle builders
//!
//! Pure transformations from stored records into outbound message bundles.
//! Every field of the source record is mapped; a record missing a field the
//! clearinghouse requires is rejected here, before any outbound call.

use thiserror::Error;

use domain_claims::{Claim, ClaimError};
use domain_coverage::{CoverageError, EligibilityCheck, PriorAuthorization};
use domain_directory::{Insurer, Patient, Provider};

use crate::bundle::{
    ClaimResource, CoverageResource, DiagnosisComponent, EligibilityRequestResource,
    ItemComponent, MessageBundle, MessageHeaderResource, OrganizationResource,
    PatientResource, PayloadComponent, AttachmentComponent, Resource, TaskResource,
};
use crate::communication::Communication;

/// Errors raised while building an outbound bundle
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Communication has no payload")]
    EmptyPayload,

    #[error("Record has not been submitted")]
    NotSubmitted,

    #[error(transparent)]
    Claim(#[from] ClaimError),

    #[error(transparent)]
    Coverage(#[from] CoverageError),
}

/// Builds the claim-request bundle for submission
pub fn claim_message(
    claim: &Claim,
    patient: &Patient,
    provider: &Provider,
    insurer: &Insurer,
) -> Result<MessageBundle, BuildError> {
    claim.validate_for_submission()?;
    check_parties(patient, provider, insurer)?;

    let mut bundle = header("claim-request", provider, insurer);
    bundle.push(Resource::Claim(map_claim(claim, "claim", patient, provider, insurer)));
    push_parties(&mut bundle, patient, provider, insurer);
    Ok(bundle)
}

/// Builds the pre-authorization bundle for submission
pub fn prior_auth_message(
    auth: &PriorAuthorization,
    patient: &Patient,
    provider: &Provider,
    insurer: &Insurer,
) -> Result<MessageBundle, BuildError> {
    auth.validate_for_submission()?;
    check_parties(patient, provider, insurer)?;

    let requested = auth.requested_amount;
    let mut bundle = header("priorauth-request", provider, insurer);
    bundle.push(Resource::Claim(ClaimResource {
        identifier: auth.id.to_string(),
        status: "active".to_string(),
        claim_type: "professional".to_string(),
        claim_use: "preauthorization".to_string(),
        patient: patient_ref(patient),
        provider: org_ref(&provider.license_number),
        insurer: org_ref(&insurer.payer_license),
        created: auth.created_at,
        currency: requested.currency().code().to_string(),
        total: requested.amount(),
        diagnosis: Vec::new(),
        item: vec![ItemComponent {
            sequence: 1,
            service_code: auth.service_code.clone(),
            description: auth.description.clone(),
            quantity: 1,
            unit_price: requested.amount(),
            net: requested.amount(),
        }],
    }));
    push_parties(&mut bundle, patient, provider, insurer);
    Ok(bundle)
}

/// Builds the eligibility-request bundle
pub fn eligibility_message(
    check: &EligibilityCheck,
    patient: &Patient,
    provider: &Provider,
    insurer: &Insurer,
) -> Result<MessageBundle, BuildError> {
    check_parties(patient, provider, insurer)?;

    let mut bundle = header("eligibility-request", provider, insurer);
    bundle.push(Resource::CoverageEligibilityRequest(EligibilityRequestResource {
        identifier: check.id.to_string(),
        purpose: check.purpose.code().to_string(),
        patient: patient_ref(patient),
        insurer: org_ref(&insurer.payer_license),
        serviced_date: check.service_date,
    }));
    push_parties(&mut bundle, patient, provider, insurer);
    Ok(bundle)
}

/// Builds the communication bundle wrapping caller-supplied payloads
pub fn communication_message(
    claim: &Claim,
    communication: &Communication,
) -> Result<MessageBundle, BuildError> {
    if communication.payloads.is_empty()
        || communication.payloads.iter().all(|p| p.is_empty())
    {
        return Err(BuildError::EmptyPayload);
    }

    let mut bundle = MessageBundle::message();
    bundle.push(Resource::MessageHeader(MessageHeaderResource {
        event: "communication".to_string(),
        source: String::new(),
        destination: "clearinghouse".to_string(),
    }));
    bundle.push(Resource::Communication(crate::bundle::CommunicationResource {
        identifier: communication.id.to_string(),
        about: claim.claim_number.clone(),
        status: communication.ack_status.code().to_string(),
        payload: communication
            .payloads
            .iter()
            .map(|p| PayloadComponent {
                content_string: p.content.clone(),
                content_attachment: p.attachment_url.as_ref().map(|url| AttachmentComponent {
                    url: url.clone(),
                    title: p.attachment_title.clone(),
                }),
            })
            .collect(),
    }));
    Ok(bundle)
}

/// Builds the status-inquiry bundle for a submitted claim
pub fn status_inquiry(claim: &Claim) -> Result<MessageBundle, BuildError> {
    if claim.submitted_at.is_none() {
        return Err(BuildError::NotSubmitted);
    }

    let mut bundle = MessageBundle::message();
    bundle.push(Resource::MessageHeader(MessageHeaderResource {
        event: "status-check".to_string(),
        source: String::new(),
        destination: "clearinghouse".to_string(),
    }));
    bundle.push(Resource::Task(TaskResource {
        code: "status-check".to_string(),
        focus: Some(claim.claim_number.clone()),
    }));
    Ok(bundle)
}

/// Builds the poll bundle asking for pending responses on a record
pub fn poll_request(focus: &str) -> MessageBundle {
    let mut bundle = MessageBundle::message();
    bundle.push(Resource::MessageHeader(MessageHeaderResource {
        event: "poll-request".to_string(),
        source: String::new(),
        destination: "clearinghouse".to_string(),
    }));
    bundle.push(Resource::Task(TaskResource {
        code: "poll".to_string(),
        focus: Some(focus.to_string()),
    }));
    bundle
}

fn check_parties(
    patient: &Patient,
    provider: &Provider,
    insurer: &Insurer,
) -> Result<(), BuildError> {
    if patient.national_id.trim().is_empty() {
        return Err(BuildError::MissingField("patient.national_id"));
    }
    if provider.license_number.trim().is_empty() {
        return Err(BuildError::MissingField("provider.license_number"));
    }
    if insurer.payer_license.trim().is_empty() {
        return Err(BuildError::MissingField("insurer.payer_license"));
    }
    Ok(())
}

fn header(event: &str, provider: &Provider, _insurer: &Insurer) -> MessageBundle {
    let mut bundle = MessageBundle::message();
    bundle.push(Resource::MessageHeader(MessageHeaderResource {
        event: event.to_string(),
        source: provider.license_number.clone(),
        destination: "clearinghouse".to_string(),
    }));
    bundle
}

fn map_claim(
    claim: &Claim,
    claim_use: &str,
    patient: &Patient,
    provider: &Provider,
    insurer: &Insurer,
) -> ClaimResource {
    ClaimResource {
        identifier: claim.claim_number.clone(),
        status: "active".to_string(),
        claim_type: claim.claim_type.code().to_string(),
        claim_use: claim_use.to_string(),
        patient: patient_ref(patient),
        provider: org_ref(&provider.license_number),
        insurer: org_ref(&insurer.payer_license),
        created: claim.created_at,
        currency: claim.currency.code().to_string(),
        total: claim.total().amount(),
        diagnosis: claim
            .diagnoses
            .iter()
            .enumerate()
            .map(|(i, d)| DiagnosisComponent {
                sequence: i as u32 + 1,
                code: d.code.clone(),
                kind: d.kind.code().to_string(),
            })
            .collect(),
        item: claim
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| ItemComponent {
                sequence: i as u32 + 1,
                service_code: item.service_code.clone(),
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price.amount(),
                net: item.net().amount(),
            })
            .collect(),
    }
}

fn push_parties(
    bundle: &mut MessageBundle,
    patient: &Patient,
    provider: &Provider,
    insurer: &Insurer,
) {
    bundle.push(Resource::Patient(PatientResource {
        identifier: patient.national_id.clone(),
        name: patient.full_name(),
        gender: patient.gender.code().to_string(),
        birth_date: patient.date_of_birth,
    }));
    bundle.push(Resource::Organization(OrganizationResource {
        identifier: provider.license_number.clone(),
        name: provider.name.clone(),
        role: "provider".to_string(),
    }));
    bundle.push(Resource::Organization(OrganizationResource {
        identifier: insurer.payer_license.clone(),
        name: insurer.name.clone(),
        role: "payer".to_string(),
    }));
    bundle.push(Resource::Coverage(CoverageResource {
        subscriber_id: patient.national_id.clone(),
        beneficiary: patient_ref(patient),
        payor: org_ref(&insurer.payer_license),
    }));
}

fn patient_ref(patient: &Patient) -> String {
    format!("Patient/{}", patient.national_id)
}

fn org_ref(license: &str) -> String {
    format!("Organization/{}", license)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::{Currency, Money};
    use domain_claims::{ClaimItem, ClaimType, Diagnosis};
    use domain_directory::{Gender, ProviderKind};
    use rust_decimal_macros::dec;

    fn parties() -> (Patient, Provider, Insurer) {
        (
            Patient::new(
                "1012345678",
                "Aisha",
                "Al-Harbi",
                NaiveDate::from_ymd_opt(1990, 3, 14).unwrap(),
                Gender::Female,
            ),
            Provider::new("Dar Alshifa Hospital", "PR-FHIR-001", ProviderKind::Hospital),
            Insurer::new("Bupa Arabia", "INS-FHIR-102"),
        )
    }

    fn sendable_claim(patient: &Patient, provider: &Provider, insurer: &Insurer) -> Claim {
        let mut claim = Claim::draft(
            patient.id,
            provider.id,
            insurer.id,
            ClaimType::Oral,
            NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            Currency::SAR,
        );
        claim.add_diagnosis(Diagnosis::principal("K02.9"));
        claim.add_item(
            ClaimItem::new("D2740", 1, Money::new(dec!(1100), Currency::SAR)),
        );
        claim.add_item(
            ClaimItem::new("D0220", 2, Money::new(dec!(75.50), Currency::SAR)),
        );
        claim
    }

    #[test]
    fn test_claim_message_maps_every_field() {
        let (patient, provider, insurer) = parties();
        let claim = sendable_claim(&patient, &provider, &insurer);

        let bundle = claim_message(&claim, &patient, &provider, &insurer).unwrap();

        // header + claim + patient + 2 organizations + coverage
        assert_eq!(bundle.entry.len(), 6);

        let claim_resource = bundle
            .resources()
            .find_map(|r| match r {
                Resource::Claim(c) => Some(c),
                _ => None,
            })
            .unwrap();

        assert_eq!(claim_resource.identifier, claim.claim_number);
        assert_eq!(claim_resource.claim_type, "oral");
        assert_eq!(claim_resource.claim_use, "claim");
        assert_eq!(claim_resource.currency, "SAR");
        assert_eq!(claim_resource.total, dec!(1251));
        assert_eq!(claim_resource.diagnosis.len(), 1);
        assert_eq!(claim_resource.diagnosis[0].code, "K02.9");
        assert_eq!(claim_resource.item.len(), 2);
        assert_eq!(claim_resource.item[0].service_code, "D2740");
        assert_eq!(claim_resource.item[1].quantity, 2);
        assert_eq!(claim_resource.item[1].net, dec!(151));
    }

    #[test]
    fn test_claim_message_rejects_missing_national_id() {
        let (mut patient, provider, insurer) = parties();
        patient.national_id = "".to_string();
        let claim = sendable_claim(&patient, &provider, &insurer);

        let result = claim_message(&claim, &patient, &provider, &insurer);
        assert!(matches!(
            result,
            Err(BuildError::MissingField("patient.national_id"))
        ));
    }

    #[test]
    fn test_claim_message_rejects_empty_items() {
        let (patient, provider, insurer) = parties();
        let mut claim = sendable_claim(&patient, &provider, &insurer);
        claim.items.clear();

        let result = claim_message(&claim, &patient, &provider, &insurer);
        assert!(matches!(
            result,
            Err(BuildError::Claim(ClaimError::MissingField("items")))
        ));
    }

    #[test]
    fn test_status_inquiry_requires_prior_submission() {
        let (patient, provider, insurer) = parties();
        let claim = sendable_claim(&patient, &provider, &insurer);

        assert!(matches!(
            status_inquiry(&claim),
            Err(BuildError::NotSubmitted)
        ));
    }

    #[test]
    fn test_communication_message_rejects_empty_payloads() {
        let (patient, provider, insurer) = parties();
        let claim = sendable_claim(&patient, &provider, &insurer);
        let comm = Communication::outbound(claim.id, vec![]);

        assert!(matches!(
            communication_message(&claim, &comm),
            Err(BuildError::EmptyPayload)
        ));
    }
}
