//! FHIR-style message bundle types
//!
//! The clearinghouse consumes and produces `message`-type bundles whose
//! entries are discriminated by their `resourceType` field. Only the
//! resources this system exchanges are modelled; unknown response fields
//! are ignored on deserialization.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::BundleId;

/// A message bundle exchanged with the clearinghouse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBundle {
    pub resource_type: String,
    pub id: BundleId,
    #[serde(rename = "type")]
    pub bundle_type: String,
    pub timestamp: DateTime<Utc>,
    pub entry: Vec<BundleEntry>,
}

impl MessageBundle {
    /// Creates an empty message bundle
    pub fn message() -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            id: BundleId::new_v7(),
            bundle_type: "message".to_string(),
            timestamp: Utc::now(),
            entry: Vec::new(),
        }
    }

    /// Appends a resource entry
    pub fn push(&mut self, resource: Resource) {
        let full_url = format!("urn:uuid:{}", uuid::Uuid::new_v4());
        self.entry.push(BundleEntry { full_url, resource });
    }

    /// Iterates over the entry resources
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry.iter().map(|e| &e.resource)
    }

    /// First claim-response entry, if any
    pub fn claim_response(&self) -> Option<&ClaimResponseResource> {
        self.resources().find_map(|r| match r {
            Resource::ClaimResponse(resp) => Some(resp),
            _ => None,
        })
    }

    /// First eligibility-response entry, if any
    pub fn eligibility_response(&self) -> Option<&EligibilityResponseResource> {
        self.resources().find_map(|r| match r {
            Resource::CoverageEligibilityResponse(resp) => Some(resp),
            _ => None,
        })
    }

    /// First operation-outcome entry, if any
    pub fn operation_outcome(&self) -> Option<&OperationOutcomeResource> {
        self.resources().find_map(|r| match r {
            Resource::OperationOutcome(outcome) => Some(outcome),
            _ => None,
        })
    }

    /// All communication entries
    pub fn communications(&self) -> Vec<&CommunicationResource> {
        self.resources()
            .filter_map(|r| match r {
                Resource::Communication(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// All communication-request entries
    pub fn communication_requests(&self) -> Vec<&CommunicationRequestResource> {
        self.resources()
            .filter_map(|r| match r {
                Resource::CommunicationRequest(c) => Some(c),
                _ => None,
            })
            .collect()
    }
}

/// A single bundle entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub full_url: String,
    pub resource: Resource,
}

/// The resources this system exchanges, keyed by `resourceType`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum Resource {
    MessageHeader(MessageHeaderResource),
    Claim(ClaimResource),
    ClaimResponse(ClaimResponseResource),
    Patient(PatientResource),
    Organization(OrganizationResource),
    Coverage(CoverageResource),
    CoverageEligibilityRequest(EligibilityRequestResource),
    CoverageEligibilityResponse(EligibilityResponseResource),
    Communication(CommunicationResource),
    CommunicationRequest(CommunicationRequestResource),
    Task(TaskResource),
    OperationOutcome(OperationOutcomeResource),
}

/// Routing header carried first in every message bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageHeaderResource {
    /// Event code, e.g. "claim-request" or "poll-request"
    pub event: String,
    /// Sender license
    pub source: String,
    /// Receiver license
    pub destination: String,
}

/// Claim resource as sent to the clearinghouse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResource {
    /// Local claim number
    pub identifier: String,
    pub status: String,
    /// Claim subtype: institutional / professional / oral / vision / pharmacy
    #[serde(rename = "type")]
    pub claim_type: String,
    /// "claim" or "preauthorization"
    #[serde(rename = "use")]
    pub claim_use: String,
    /// Reference to the patient entry
    pub patient: String,
    /// Reference to the provider organization entry
    pub provider: String,
    /// Reference to the insurer organization entry
    pub insurer: String,
    pub created: DateTime<Utc>,
    pub currency: String,
    pub total: Decimal,
    #[serde(default)]
    pub diagnosis: Vec<DiagnosisComponent>,
    #[serde(default)]
    pub item: Vec<ItemComponent>,
}

/// One coded diagnosis on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisComponent {
    pub sequence: u32,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One billed line on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemComponent {
    pub sequence: u32,
    pub service_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub net: Decimal,
}

/// Adjudication answer for a claim or prior authorization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponseResource {
    /// Identifier of the claim being answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_identifier: Option<String>,
    /// "queued" | "complete" | "error"
    pub outcome: String,
    /// "approved" | "partial" | "denied", present when outcome is complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    /// Free-text disposition from the payer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<String>,
    /// Authorization number, on pre-authorization approvals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_auth_ref: Option<String>,
    /// Approval expiry, on pre-authorization approvals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_auth_period_end: Option<NaiveDate>,
    /// Amount the payer settled on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_amount: Option<Decimal>,
}

/// Patient demographics on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResource {
    /// National id or iqama number
    pub identifier: String,
    pub name: String,
    pub gender: String,
    pub birth_date: NaiveDate,
}

/// Provider or insurer organization on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationResource {
    /// Clearinghouse-issued license
    pub identifier: String,
    pub name: String,
    /// "provider" or "payer"
    pub role: String,
}

/// Coverage linking a patient to an insurer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageResource {
    /// Member identifier (national id)
    pub subscriber_id: String,
    /// Reference to the patient entry
    pub beneficiary: String,
    /// Reference to the insurer organization entry
    pub payor: String,
}

/// Eligibility question on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityRequestResource {
    pub identifier: String,
    /// "benefits" | "discovery" | "validation"
    pub purpose: String,
    pub patient: String,
    pub insurer: String,
    pub serviced_date: NaiveDate,
}

/// Eligibility answer on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResponseResource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_identifier: Option<String>,
    /// Whether coverage is in force
    pub inforce: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_eligibility: Option<String>,
    #[serde(default)]
    pub benefit_notes: Vec<String>,
}

/// Free-form communication payloads on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationResource {
    pub identifier: String,
    /// Identifier of the claim the communication concerns
    pub about: String,
    /// "queued" | "acknowledged" | "error"
    pub status: String,
    #[serde(default)]
    pub payload: Vec<PayloadComponent>,
}

/// Inbound request for further information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationRequestResource {
    pub identifier: String,
    /// Identifier of the claim the request concerns
    pub about: String,
    #[serde(default)]
    pub payload: Vec<PayloadComponent>,
}

/// One payload element of a communication
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadComponent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_attachment: Option<AttachmentComponent>,
}

/// An attachment carried in a communication payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentComponent {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Status-inquiry / poll task on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResource {
    /// "status-check" or "poll"
    pub code: String,
    /// Identifier of the record being asked about
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
}

/// One issue inside an operation outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeIssue {
    /// "error" | "warning" | "information"
    pub severity: String,
    pub details: String,
}

/// Errors and warnings returned instead of a business response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationOutcomeResource {
    #[serde(default)]
    pub issue: Vec<OutcomeIssue>,
}

impl OperationOutcomeResource {
    /// Concatenated error details, for surfacing to the caller
    pub fn error_text(&self) -> String {
        let errors: Vec<&str> = self
            .issue
            .iter()
            .filter(|i| i.severity == "error")
            .map(|i| i.details.as_str())
            .collect();
        if errors.is_empty() {
            "clearinghouse returned an unspecified error".to_string()
        } else {
            errors.join("; ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_tag_roundtrip() {
        let mut bundle = MessageBundle::message();
        bundle.push(Resource::MessageHeader(MessageHeaderResource {
            event: "claim-request".to_string(),
            source: "PR-001".to_string(),
            destination: "nphies".to_string(),
        }));

        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["resourceType"], "Bundle");
        assert_eq!(json["type"], "message");
        assert_eq!(json["entry"][0]["resource"]["resourceType"], "MessageHeader");

        let parsed: MessageBundle = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.entry.len(), 1);
    }

    #[test]
    fn test_claim_response_lookup() {
        let mut bundle = MessageBundle::message();
        bundle.push(Resource::ClaimResponse(ClaimResponseResource {
            request_identifier: Some("CLM-42".to_string()),
            outcome: "queued".to_string(),
            decision: None,
            disposition: None,
            pre_auth_ref: None,
            pre_auth_period_end: None,
            approved_amount: None,
        }));

        let resp = bundle.claim_response().unwrap();
        assert_eq!(resp.outcome, "queued");
        assert!(bundle.operation_outcome().is_none());
    }

    #[test]
    fn test_operation_outcome_error_text() {
        let outcome = OperationOutcomeResource {
            issue: vec![
                OutcomeIssue {
                    severity: "warning".to_string(),
                    details: "ignored".to_string(),
                },
                OutcomeIssue {
                    severity: "error".to_string(),
                    details: "member not found".to_string(),
                },
            ],
        };
        assert_eq!(outcome.error_text(), "member not found");
    }
}
