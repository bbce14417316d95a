//! Submission workflow
//!
//! `SubmissionService` orchestrates every exchange operation the same way:
//! load the row, build (or reuse) a message, make exactly one outbound
//! call, parse one response, write the result back, return the updated
//! record. A transport failure surfaces to the caller and leaves the row
//! untouched; there are no compensating actions.

use chrono::NaiveDate;
use std::sync::Arc;

use core_kernel::{
    ClaimId, InsurerId, Money, PatientId, PortError, PriorAuthId, ProviderId,
};
use domain_claims::{Claim, ClaimStatus, ClaimStore};
use domain_coverage::{
    AuthStatus, CoverageStore, EligibilityCheck, EligibilityPurpose, PriorAuthorization,
};
use domain_directory::{DirectoryStore, Insurer, Patient, Provider};

use crate::builder;
use crate::bundle::MessageBundle;
use crate::communication::{
    AckStatus, Communication, CommunicationPayload, CommunicationStore,
};
use crate::outcome::{self, AuthDisposition, ClaimDisposition};
use crate::ports::ExchangeGateway;

/// Orchestrates the clearinghouse workflow over the store and gateway ports
pub struct SubmissionService {
    claims: Arc<dyn ClaimStore>,
    communications: Arc<dyn CommunicationStore>,
    coverage: Arc<dyn CoverageStore>,
    directory: Arc<dyn DirectoryStore>,
    gateway: Arc<dyn ExchangeGateway>,
}

impl SubmissionService {
    /// Creates the service over its port implementations
    pub fn new(
        claims: Arc<dyn ClaimStore>,
        communications: Arc<dyn CommunicationStore>,
        coverage: Arc<dyn CoverageStore>,
        directory: Arc<dyn DirectoryStore>,
        gateway: Arc<dyn ExchangeGateway>,
    ) -> Self {
        Self {
            claims,
            communications,
            coverage,
            directory,
            gateway,
        }
    }

    // ========================================================================
    // Claims
    // ========================================================================

    /// Submits a draft (or previously errored) claim to the clearinghouse
    pub async fn send_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        let mut claim = self.claims.get(id).await?;
        if !claim.is_sendable() {
            return Err(PortError::conflict(format!(
                "claim {} is not in a sendable status ({})",
                claim.claim_number,
                claim.status.code()
            )));
        }

        let (patient, provider, insurer) = self
            .load_parties(claim.patient_id, claim.provider_id, claim.insurer_id)
            .await?;

        // Validation happens in the builder, before any outbound call.
        let bundle = builder::claim_message(&claim, &patient, &provider, &insurer)
            .map_err(|e| PortError::validation(e.to_string()))?;

        let response = self.gateway.exchange(&bundle).await?;

        claim.record_submission(raw_json(&response)?);
        claim
            .update_status(ClaimStatus::Queued)
            .map_err(|e| PortError::conflict(e.to_string()))?;
        self.apply_claim_disposition(&mut claim, outcome::claim_disposition(&response))?;
        self.claims.save(&claim).await?;

        tracing::info!(
            claim = %claim.claim_number,
            status = claim.status.code(),
            "claim submitted"
        );
        Ok(claim)
    }

    /// Makes one status-inquiry round trip for a submitted claim
    pub async fn check_claim_status(&self, id: ClaimId) -> Result<Claim, PortError> {
        let mut claim = self.claims.get(id).await?;

        let bundle =
            builder::status_inquiry(&claim).map_err(|e| PortError::validation(e.to_string()))?;
        let response = self.gateway.exchange(&bundle).await?;

        claim.record_response(raw_json(&response)?);
        self.apply_claim_disposition(&mut claim, outcome::claim_disposition(&response))?;
        self.claims.save(&claim).await?;

        tracing::info!(
            claim = %claim.claim_number,
            status = claim.status.code(),
            "claim status checked"
        );
        Ok(claim)
    }

    /// Polls for a pending adjudication result
    ///
    /// A claim that is not poll-eligible is returned unchanged without any
    /// outbound call.
    pub async fn poll_claim(&self, id: ClaimId) -> Result<Claim, PortError> {
        let mut claim = self.claims.get(id).await?;
        if !claim.is_poll_eligible() {
            tracing::debug!(
                claim = %claim.claim_number,
                status = claim.status.code(),
                "poll skipped, claim is not queued"
            );
            return Ok(claim);
        }

        let bundle = builder::poll_request(&claim.claim_number);
        let response = self.gateway.exchange(&bundle).await?;

        claim.record_response(raw_json(&response)?);
        self.apply_claim_disposition(&mut claim, outcome::claim_disposition(&response))?;
        self.claims.save(&claim).await?;

        tracing::info!(
            claim = %claim.claim_number,
            status = claim.status.code(),
            "claim polled"
        );
        Ok(claim)
    }

    // ========================================================================
    // Communications
    // ========================================================================

    /// Wraps caller-supplied payloads in a communication and sends it
    pub async fn send_communication(
        &self,
        claim_id: ClaimId,
        payloads: Vec<CommunicationPayload>,
    ) -> Result<Communication, PortError> {
        let claim = self.claims.get(claim_id).await?;
        let mut communication = Communication::outbound(claim_id, payloads);

        let bundle = builder::communication_message(&claim, &communication)
            .map_err(|e| PortError::validation(e.to_string()))?;

        match self.gateway.exchange(&bundle).await {
            Ok(response) => {
                if response.operation_outcome().is_some() {
                    communication.ack_status = AckStatus::Error;
                }
                self.communications.insert(&communication).await?;
                tracing::info!(
                    claim = %claim.claim_number,
                    communication = %communication.id,
                    ack = communication.ack_status.code(),
                    "communication sent"
                );
                Ok(communication)
            }
            Err(e) => {
                communication.ack_status = AckStatus::Error;
                self.communications.insert(&communication).await?;
                Err(e)
            }
        }
    }

    /// Polls for communication acknowledgments and inbound requests
    pub async fn poll_communications(
        &self,
        claim_id: ClaimId,
    ) -> Result<Vec<Communication>, PortError> {
        let claim = self.claims.get(claim_id).await?;

        let bundle = builder::poll_request(&claim.claim_number);
        let response = self.gateway.exchange(&bundle).await?;

        let mut existing = self.communications.list_for_claim(claim_id).await?;

        // Acknowledgments for rows we sent earlier.
        for ack in response.communications() {
            let matched = existing.iter_mut().find(|c| {
                c.id.to_string() == ack.identifier
                    || c.reference.as_deref() == Some(ack.identifier.as_str())
            });
            if let Some(row) = matched {
                let next = match ack.status.as_str() {
                    "acknowledged" => Some(AckStatus::Acknowledged),
                    "error" => Some(AckStatus::Error),
                    _ => None,
                };
                if let Some(status) = next {
                    if row.ack_status != status {
                        row.ack_status = status;
                        self.communications.save(row).await?;
                    }
                }
            }
        }

        // Requests for information from the payer, recorded once each.
        let mut seen_refs: std::collections::HashSet<String> = existing
            .iter()
            .filter_map(|c| c.reference.clone())
            .collect();
        for request in response.communication_requests() {
            if !seen_refs.insert(request.identifier.clone()) {
                continue;
            }
            let payloads = request
                .payload
                .iter()
                .map(|p| CommunicationPayload {
                    content: p.content_string.clone(),
                    attachment_url: p.content_attachment.as_ref().map(|a| a.url.clone()),
                    attachment_title: p
                        .content_attachment
                        .as_ref()
                        .and_then(|a| a.title.clone()),
                })
                .collect();
            let inbound = Communication::inbound(claim_id, &request.identifier, payloads);
            self.communications.insert(&inbound).await?;
        }

        self.communications.list_for_claim(claim_id).await
    }

    /// Lists communications for a claim in creation order
    pub async fn list_communications(
        &self,
        claim_id: ClaimId,
    ) -> Result<Vec<Communication>, PortError> {
        // Existence check keeps a typo'd claim id a 404 rather than an empty list.
        self.claims.get(claim_id).await?;
        self.communications.list_for_claim(claim_id).await
    }

    // ========================================================================
    // Eligibility
    // ========================================================================

    /// Makes one eligibility round trip and records the outcome
    pub async fn check_eligibility(
        &self,
        patient_id: PatientId,
        provider_id: ProviderId,
        insurer_id: InsurerId,
        service_date: NaiveDate,
        purpose: EligibilityPurpose,
    ) -> Result<EligibilityCheck, PortError> {
        let (patient, provider, insurer) = self
            .load_parties(patient_id, provider_id, insurer_id)
            .await?;

        let mut check =
            EligibilityCheck::new(patient_id, provider_id, insurer_id, service_date, purpose);

        let bundle = builder::eligibility_message(&check, &patient, &provider, &insurer)
            .map_err(|e| PortError::validation(e.to_string()))?;
        let response = self.gateway.exchange(&bundle).await?;

        let outcome = outcome::eligibility_outcome(&response)
            .map_err(|message| PortError::internal(message))?;
        check.record_outcome(outcome);
        self.coverage.insert_eligibility(&check).await?;

        tracing::info!(check = %check.id, "eligibility checked");
        Ok(check)
    }

    // ========================================================================
    // Prior authorizations
    // ========================================================================

    /// Submits a draft (or previously errored) prior authorization
    pub async fn send_prior_auth(
        &self,
        id: PriorAuthId,
    ) -> Result<PriorAuthorization, PortError> {
        let mut auth = self.coverage.get_prior_auth(id).await?;
        if !auth.is_sendable() {
            return Err(PortError::conflict(format!(
                "prior authorization {} is not in a sendable status ({})",
                auth.id,
                auth.status.code()
            )));
        }

        let (patient, provider, insurer) = self
            .load_parties(auth.patient_id, auth.provider_id, auth.insurer_id)
            .await?;

        let bundle = builder::prior_auth_message(&auth, &patient, &provider, &insurer)
            .map_err(|e| PortError::validation(e.to_string()))?;
        let response = self.gateway.exchange(&bundle).await?;

        auth.record_submission(raw_json(&response)?);
        auth.update_status(AuthStatus::Queued)
            .map_err(|e| PortError::conflict(e.to_string()))?;
        self.apply_auth_disposition(&mut auth, outcome::auth_disposition(&response))?;
        self.coverage.save_prior_auth(&auth).await?;

        tracing::info!(auth = %auth.id, status = auth.status.code(), "prior authorization submitted");
        Ok(auth)
    }

    /// Polls for a pending prior-authorization decision
    pub async fn poll_prior_auth(
        &self,
        id: PriorAuthId,
    ) -> Result<PriorAuthorization, PortError> {
        let mut auth = self.coverage.get_prior_auth(id).await?;
        if !auth.is_poll_eligible() {
            tracing::debug!(
                auth = %auth.id,
                status = auth.status.code(),
                "poll skipped, authorization is not queued"
            );
            return Ok(auth);
        }

        let bundle = builder::poll_request(&auth.id.to_string());
        let response = self.gateway.exchange(&bundle).await?;

        auth.record_response(raw_json(&response)?);
        self.apply_auth_disposition(&mut auth, outcome::auth_disposition(&response))?;
        self.coverage.save_prior_auth(&auth).await?;

        tracing::info!(auth = %auth.id, status = auth.status.code(), "prior authorization polled");
        Ok(auth)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load_parties(
        &self,
        patient_id: PatientId,
        provider_id: ProviderId,
        insurer_id: InsurerId,
    ) -> Result<(Patient, Provider, Insurer), PortError> {
        let patient = self.directory.get_patient(patient_id).await?;
        let provider = self.directory.get_provider(provider_id).await?;
        let insurer = self.directory.get_insurer(insurer_id).await?;
        Ok((patient, provider, insurer))
    }

    fn apply_claim_disposition(
        &self,
        claim: &mut Claim,
        disposition: ClaimDisposition,
    ) -> Result<(), PortError> {
        let (target, note) = match disposition {
            ClaimDisposition::Queued => (ClaimStatus::Queued, None),
            ClaimDisposition::Approved { note } => (ClaimStatus::Approved, note),
            ClaimDisposition::Denied { reason } => (ClaimStatus::Denied, reason),
            ClaimDisposition::Error { message } => (ClaimStatus::Error, Some(message)),
        };

        if note.is_some() {
            claim.disposition_note = note;
        }
        if claim.status != target {
            claim
                .update_status(target)
                .map_err(|e| PortError::conflict(e.to_string()))?;
        }
        Ok(())
    }

    fn apply_auth_disposition(
        &self,
        auth: &mut PriorAuthorization,
        disposition: AuthDisposition,
    ) -> Result<(), PortError> {
        match disposition {
            AuthDisposition::Queued => Ok(()),
            AuthDisposition::Approved {
                auth_number,
                approved_amount,
                expiry_date,
            } => {
                let amount = approved_amount
                    .map(|d| Money::new(d, auth.requested_amount.currency()))
                    .unwrap_or(auth.requested_amount);
                let number = auth_number.unwrap_or_else(|| auth.id.to_string());
                auth.record_approval(number, amount, expiry_date)
                    .map_err(|e| PortError::conflict(e.to_string()))
            }
            AuthDisposition::Denied { reason } => {
                auth.denial_reason = reason;
                auth.update_status(AuthStatus::Denied)
                    .map_err(|e| PortError::conflict(e.to_string()))
            }
            AuthDisposition::Error { .. } => auth
                .update_status(AuthStatus::Error)
                .map_err(|e| PortError::conflict(e.to_string())),
        }
    }
}

fn raw_json(response: &MessageBundle) -> Result<serde_json::Value, PortError> {
    serde_json::to_value(response)
        .map_err(|e| PortError::internal(format!("failed to store raw response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    use domain_claims::ports::mock::MockClaimStore;
    use domain_claims::{ClaimItem, ClaimType, Diagnosis};
    use domain_coverage::ports::mock::MockCoverageStore;
    use domain_directory::ports::mock::MockDirectoryStore;
    use domain_directory::{Gender, ProviderKind};

    use crate::bundle::{
        ClaimResponseResource, CommunicationRequestResource, CommunicationResource,
        EligibilityResponseResource, OperationOutcomeResource, OutcomeIssue, PayloadComponent,
        Resource,
    };
    use crate::communication::mock::MockCommunicationStore;
    use crate::communication::Direction;
    use crate::ports::mock::MockGateway;

    struct World {
        service: SubmissionService,
        claims: Arc<MockClaimStore>,
        coverage: Arc<MockCoverageStore>,
        gateway: Arc<MockGateway>,
        patient: Patient,
        provider: Provider,
        insurer: Insurer,
    }

    async fn world() -> World {
        let patient = Patient::new(
            "1012345678",
            "Aisha",
            "Al-Harbi",
            NaiveDate::from_ymd_opt(1990, 3, 14).unwrap(),
            Gender::Female,
        );
        let provider = Provider::new("Dar Alshifa Hospital", "PR-FHIR-001", ProviderKind::Hospital);
        let insurer = Insurer::new("Bupa Arabia", "INS-FHIR-102");

        let directory = Arc::new(
            MockDirectoryStore::with_parties(patient.clone(), provider.clone(), insurer.clone())
                .await,
        );
        let claims = Arc::new(MockClaimStore::new());
        let communications = Arc::new(MockCommunicationStore::new());
        let coverage = Arc::new(MockCoverageStore::new());
        let gateway = Arc::new(MockGateway::new());

        let service = SubmissionService::new(
            claims.clone(),
            communications.clone(),
            coverage.clone(),
            directory,
            gateway.clone(),
        );

        World {
            service,
            claims,
            coverage,
            gateway,
            patient,
            provider,
            insurer,
        }
    }

    async fn seed_claim(world: &World, complete: bool) -> Claim {
        let mut claim = Claim::draft(
            world.patient.id,
            world.provider.id,
            world.insurer.id,
            ClaimType::Professional,
            NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            Currency::SAR,
        );
        if complete {
            claim.add_diagnosis(Diagnosis::principal("E11.9"));
            claim.add_item(ClaimItem::new(
                "99213",
                1,
                Money::new(dec!(250), Currency::SAR),
            ));
        }
        world.claims.insert(&claim).await.unwrap();
        claim
    }

    fn response(outcome: &str, decision: Option<&str>, disposition: Option<&str>) -> MessageBundle {
        let mut bundle = MessageBundle::message();
        bundle.push(Resource::ClaimResponse(ClaimResponseResource {
            request_identifier: None,
            outcome: outcome.to_string(),
            decision: decision.map(|d| d.to_string()),
            disposition: disposition.map(|d| d.to_string()),
            pre_auth_ref: None,
            pre_auth_period_end: None,
            approved_amount: None,
        }));
        bundle
    }

    #[tokio::test]
    async fn test_send_claim_lands_queued() {
        let world = world().await;
        let claim = seed_claim(&world, true).await;
        world
            .gateway
            .push_response(response("queued", None, None))
            .await;

        let sent = world.service.send_claim(claim.id).await.unwrap();

        assert_eq!(sent.status, ClaimStatus::Queued);
        assert!(sent.submitted_at.is_some());
        assert!(sent.last_response.is_some());
        assert_eq!(world.gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_send_incomplete_claim_makes_no_outbound_call() {
        let world = world().await;
        let claim = seed_claim(&world, false).await;

        let result = world.service.send_claim(claim.id).await;

        assert!(matches!(result, Err(PortError::Validation { .. })));
        assert_eq!(world.gateway.calls(), 0);

        // Row untouched.
        let stored = world.claims.get(claim.id).await.unwrap();
        assert_eq!(stored.status, ClaimStatus::Draft);
    }

    #[tokio::test]
    async fn test_send_queued_claim_conflicts() {
        let world = world().await;
        let claim = seed_claim(&world, true).await;
        world
            .gateway
            .push_response(response("queued", None, None))
            .await;
        world.service.send_claim(claim.id).await.unwrap();

        let result = world.service.send_claim(claim.id).await;
        assert!(matches!(result, Err(PortError::Conflict { .. })));
        assert_eq!(world.gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_poll_on_adjudicated_claim_is_noop() {
        let world = world().await;
        let claim = seed_claim(&world, true).await;
        world
            .gateway
            .push_response(response("complete", Some("approved"), None))
            .await;
        world.service.send_claim(claim.id).await.unwrap();
        assert_eq!(world.gateway.calls(), 1);

        let polled = world.service.poll_claim(claim.id).await.unwrap();

        assert_eq!(polled.status, ClaimStatus::Approved);
        assert_eq!(world.gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_two_sequential_polls_make_one_call_each() {
        let world = world().await;
        let claim = seed_claim(&world, true).await;
        world
            .gateway
            .push_response(response("queued", None, None))
            .await;
        world.service.send_claim(claim.id).await.unwrap();

        world
            .gateway
            .push_response(response("queued", None, None))
            .await;
        let first = world.service.poll_claim(claim.id).await.unwrap();
        assert_eq!(first.status, ClaimStatus::Queued);
        assert_eq!(world.gateway.calls(), 2);

        world
            .gateway
            .push_response(response("complete", Some("denied"), Some("benefit exhausted")))
            .await;
        let second = world.service.poll_claim(claim.id).await.unwrap();
        assert_eq!(second.status, ClaimStatus::Denied);
        assert_eq!(second.disposition_note.as_deref(), Some("benefit exhausted"));
        assert_eq!(world.gateway.calls(), 3);
    }

    #[tokio::test]
    async fn test_operation_outcome_marks_claim_error() {
        let world = world().await;
        let claim = seed_claim(&world, true).await;

        let mut bundle = MessageBundle::message();
        bundle.push(Resource::OperationOutcome(OperationOutcomeResource {
            issue: vec![OutcomeIssue {
                severity: "error".to_string(),
                details: "member not found".to_string(),
            }],
        }));
        world.gateway.push_response(bundle).await;

        let sent = world.service.send_claim(claim.id).await.unwrap();
        assert_eq!(sent.status, ClaimStatus::Error);
        assert_eq!(sent.disposition_note.as_deref(), Some("member not found"));

        // An errored claim can be re-sent.
        assert!(sent.is_sendable());
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_row_untouched() {
        let world = world().await;
        let claim = seed_claim(&world, true).await;
        world
            .gateway
            .push_error(PortError::ServiceUnavailable {
                service: "clearinghouse (503)".to_string(),
            })
            .await;

        let result = world.service.send_claim(claim.id).await;
        assert!(matches!(result, Err(PortError::ServiceUnavailable { .. })));

        let stored = world.claims.get(claim.id).await.unwrap();
        assert_eq!(stored.status, ClaimStatus::Draft);
        assert!(stored.submitted_at.is_none());
    }

    #[tokio::test]
    async fn test_communication_listed_exactly_once_in_order() {
        let world = world().await;
        let claim = seed_claim(&world, true).await;

        world.gateway.push_response(MessageBundle::message()).await;
        let first = world
            .service
            .send_communication(claim.id, vec![CommunicationPayload::text("discharge summary")])
            .await
            .unwrap();

        world.gateway.push_response(MessageBundle::message()).await;
        let second = world
            .service
            .send_communication(claim.id, vec![CommunicationPayload::text("lab results")])
            .await
            .unwrap();

        let listed = world.service.list_communications(claim.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
        assert_eq!(listed[0].ack_status, AckStatus::Queued);
    }

    #[tokio::test]
    async fn test_empty_communication_rejected_before_outbound_call() {
        let world = world().await;
        let claim = seed_claim(&world, true).await;

        let result = world.service.send_communication(claim.id, vec![]).await;
        assert!(matches!(result, Err(PortError::Validation { .. })));
        assert_eq!(world.gateway.calls(), 0);

        let listed = world.service.list_communications(claim.id).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_failed_communication_recorded_with_error_ack() {
        let world = world().await;
        let claim = seed_claim(&world, true).await;
        world
            .gateway
            .push_error(PortError::connection("clearinghouse unreachable"))
            .await;

        let result = world
            .service
            .send_communication(claim.id, vec![CommunicationPayload::text("note")])
            .await;
        assert!(result.is_err());

        let listed = world.service.list_communications(claim.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].ack_status, AckStatus::Error);
    }

    #[tokio::test]
    async fn test_poll_acknowledges_and_records_inbound_once() {
        let world = world().await;
        let claim = seed_claim(&world, true).await;

        world.gateway.push_response(MessageBundle::message()).await;
        let outbound = world
            .service
            .send_communication(claim.id, vec![CommunicationPayload::text("attachment list")])
            .await
            .unwrap();

        let poll_response = || {
            let mut bundle = MessageBundle::message();
            bundle.push(Resource::Communication(CommunicationResource {
                identifier: outbound.id.to_string(),
                about: claim.claim_number.clone(),
                status: "acknowledged".to_string(),
                payload: vec![],
            }));
            bundle.push(Resource::CommunicationRequest(CommunicationRequestResource {
                identifier: "CRQ-555".to_string(),
                about: claim.claim_number.clone(),
                payload: vec![PayloadComponent {
                    content_string: Some("please attach radiology report".to_string()),
                    content_attachment: None,
                }],
            }));
            bundle
        };

        world.gateway.push_response(poll_response()).await;
        let after_first = world.service.poll_communications(claim.id).await.unwrap();
        assert_eq!(after_first.len(), 2);
        assert_eq!(after_first[0].ack_status, AckStatus::Acknowledged);
        assert_eq!(after_first[1].direction, Direction::Inbound);

        // Same response again: the inbound request is not duplicated.
        world.gateway.push_response(poll_response()).await;
        let after_second = world.service.poll_communications(claim.id).await.unwrap();
        assert_eq!(after_second.len(), 2);
    }

    #[tokio::test]
    async fn test_eligibility_check_records_outcome() {
        let world = world().await;

        let mut bundle = MessageBundle::message();
        bundle.push(Resource::CoverageEligibilityResponse(
            EligibilityResponseResource {
                request_identifier: None,
                inforce: true,
                site_eligibility: Some("eligible".to_string()),
                benefit_notes: vec!["annual dental limit 5000 SAR".to_string()],
            },
        ));
        world.gateway.push_response(bundle).await;

        let check = world
            .service
            .check_eligibility(
                world.patient.id,
                world.provider.id,
                world.insurer.id,
                NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
                EligibilityPurpose::Benefits,
            )
            .await
            .unwrap();

        assert!(check.outcome.as_ref().unwrap().eligible);
        assert_eq!(world.gateway.calls(), 1);

        let stored = world.coverage.get_eligibility(check.id).await.unwrap();
        assert!(stored.checked_at.is_some());
    }

    #[tokio::test]
    async fn test_prior_auth_send_then_partial_approval() {
        let world = world().await;
        let auth = PriorAuthorization::draft(
            world.patient.id,
            world.provider.id,
            world.insurer.id,
            "D2740",
            Money::new(dec!(1500), Currency::SAR),
        );
        world.coverage.insert_prior_auth(&auth).await.unwrap();

        world
            .gateway
            .push_response(response("queued", None, None))
            .await;
        let sent = world.service.send_prior_auth(auth.id).await.unwrap();
        assert_eq!(sent.status, AuthStatus::Queued);

        let mut approval = MessageBundle::message();
        approval.push(Resource::ClaimResponse(ClaimResponseResource {
            request_identifier: None,
            outcome: "complete".to_string(),
            decision: Some("partial".to_string()),
            disposition: None,
            pre_auth_ref: Some("AUTH-2207".to_string()),
            pre_auth_period_end: NaiveDate::from_ymd_opt(2025, 12, 31),
            approved_amount: Some(dec!(900)),
        }));
        world.gateway.push_response(approval).await;

        let polled = world.service.poll_prior_auth(auth.id).await.unwrap();
        assert_eq!(polled.status, AuthStatus::PartiallyApproved);
        assert_eq!(polled.auth_number.as_deref(), Some("AUTH-2207"));
        assert_eq!(polled.approved_amount.unwrap().amount(), dec!(900));
        assert_eq!(world.gateway.calls(), 2);

        // Decision reached: further polls are no-ops.
        let again = world.service.poll_prior_auth(auth.id).await.unwrap();
        assert_eq!(again.status, AuthStatus::PartiallyApproved);
        assert_eq!(world.gateway.calls(), 2);
    }
}
