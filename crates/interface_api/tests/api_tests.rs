//! Route-level tests
//!
//! Exercise the workflow action routes over HTTP against mock store and
//! gateway adapters, covering the exchange behaviors end to end.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::{Currency, Money};
use domain_claims::ports::mock::MockClaimStore;
use domain_claims::{Claim, ClaimItem, ClaimStore, ClaimType, Diagnosis};
use domain_coverage::ports::mock::MockCoverageStore;
use domain_directory::ports::mock::MockDirectoryStore;
use domain_directory::{Gender, Insurer, Patient, Provider, ProviderKind};
use domain_exchange::bundle::{
    ClaimResponseResource, EligibilityResponseResource, MessageBundle, Resource,
};
use domain_exchange::ports::mock::MockGateway;
use domain_exchange::SubmissionService;

use interface_api::{config::ApiConfig, create_router, AppState};

struct TestApp {
    server: TestServer,
    gateway: Arc<MockGateway>,
    claims: Arc<MockClaimStore>,
    patient: Patient,
    provider: Provider,
    insurer: Insurer,
}

async fn spawn_app() -> TestApp {
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
    let communications = Arc::new(domain_exchange::communication::mock::MockCommunicationStore::new());
    let coverage = Arc::new(MockCoverageStore::new());
    let gateway = Arc::new(MockGateway::new());

    let service = Arc::new(SubmissionService::new(
        claims.clone(),
        communications,
        coverage.clone(),
        directory,
        gateway.clone(),
    ));

    let state = AppState {
        service,
        coverage,
        health: gateway.clone(),
        config: ApiConfig::default(),
    };

    let server = TestServer::new(create_router(state)).unwrap();

    TestApp {
        server,
        gateway,
        claims,
        patient,
        provider,
        insurer,
    }
}

async fn seed_claim(app: &TestApp, complete: bool) -> Claim {
    let mut claim = Claim::draft(
        app.patient.id,
        app.provider.id,
        app.insurer.id,
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
    app.claims.insert(&claim).await.unwrap();
    claim
}

fn queued_response() -> MessageBundle {
    let mut bundle = MessageBundle::message();
    bundle.push(Resource::ClaimResponse(ClaimResponseResource {
        request_identifier: None,
        outcome: "queued".to_string(),
        decision: None,
        disposition: None,
        pre_auth_ref: None,
        pre_auth_period_end: None,
        approved_amount: None,
    }));
    bundle
}

fn approved_response() -> MessageBundle {
    let mut bundle = MessageBundle::message();
    bundle.push(Resource::ClaimResponse(ClaimResponseResource {
        request_identifier: None,
        outcome: "complete".to_string(),
        decision: Some("approved".to_string()),
        disposition: None,
        pre_auth_ref: None,
        pre_auth_period_end: None,
        approved_amount: None,
    }));
    bundle
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = spawn_app().await;

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = app.server.get("/health/ready").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_send_claim_over_http() {
    let app = spawn_app().await;
    let claim = seed_claim(&app, true).await;
    app.gateway.push_response(queued_response()).await;

    let response = app
        .server
        .post(&format!("/api/v1/claims/{}/send", claim.id.as_uuid()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "queued");
    assert_eq!(body["claim_number"], claim.claim_number.as_str());
    assert_eq!(app.gateway.calls(), 1);
}

#[tokio::test]
async fn test_send_unknown_claim_is_404() {
    let app = spawn_app().await;

    let response = app
        .server
        .post(&format!("/api/v1/claims/{}/send", uuid::Uuid::new_v4()))
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.gateway.calls(), 0);
}

#[tokio::test]
async fn test_send_incomplete_claim_is_400_without_outbound_call() {
    let app = spawn_app().await;
    let claim = seed_claim(&app, false).await;

    let response = app
        .server
        .post(&format!("/api/v1/claims/{}/send", claim.id.as_uuid()))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.gateway.calls(), 0);
}

#[tokio::test]
async fn test_poll_after_adjudication_is_noop() {
    let app = spawn_app().await;
    let claim = seed_claim(&app, true).await;

    app.gateway.push_response(approved_response()).await;
    let sent = app
        .server
        .post(&format!("/api/v1/claims/{}/send", claim.id.as_uuid()))
        .await;
    assert_eq!(sent.status_code(), StatusCode::OK);

    let response = app
        .server
        .post(&format!("/api/v1/claims/{}/poll", claim.id.as_uuid()))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "approved");
    // The poll made no second round trip.
    assert_eq!(app.gateway.calls(), 1);
}

#[tokio::test]
async fn test_gateway_outage_maps_to_502() {
    let app = spawn_app().await;
    let claim = seed_claim(&app, true).await;
    app.gateway
        .push_error(core_kernel::PortError::ServiceUnavailable {
            service: "clearinghouse (503)".to_string(),
        })
        .await;

    let response = app
        .server
        .post(&format!("/api/v1/claims/{}/send", claim.id.as_uuid()))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_communications_roundtrip_over_http() {
    let app = spawn_app().await;
    let claim = seed_claim(&app, true).await;

    // Empty payload list fails validation before any call.
    let response = app
        .server
        .post(&format!(
            "/api/v1/claims/{}/communications",
            claim.id.as_uuid()
        ))
        .json(&json!({ "payloads": [] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.gateway.calls(), 0);

    app.gateway.push_response(MessageBundle::message()).await;
    let response = app
        .server
        .post(&format!(
            "/api/v1/claims/{}/communications",
            claim.id.as_uuid()
        ))
        .json(&json!({
            "payloads": [{ "content": "discharge summary attached" }]
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let sent: Value = response.json();
    assert_eq!(sent["ack_status"], "queued");
    assert_eq!(sent["direction"], "outbound");

    let response = app
        .server
        .get(&format!(
            "/api/v1/claims/{}/communications",
            claim.id.as_uuid()
        ))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let listed: Value = response.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], sent["id"]);
}

#[tokio::test]
async fn test_eligibility_check_over_http() {
    let app = spawn_app().await;

    let mut bundle = MessageBundle::message();
    bundle.push(Resource::CoverageEligibilityResponse(
        EligibilityResponseResource {
            request_identifier: None,
            inforce: true,
            site_eligibility: Some("eligible".to_string()),
            benefit_notes: vec![],
        },
    ));
    app.gateway.push_response(bundle).await;

    let response = app
        .server
        .post("/api/v1/eligibility")
        .json(&json!({
            "patient_id": app.patient.id.as_uuid(),
            "provider_id": app.provider.id.as_uuid(),
            "insurer_id": app.insurer.id.as_uuid(),
            "service_date": "2025-09-01",
            "purpose": "benefits"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["eligible"], true);
}

#[tokio::test]
async fn test_eligibility_unknown_purpose_is_400() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/v1/eligibility")
        .json(&json!({
            "patient_id": app.patient.id.as_uuid(),
            "provider_id": app.provider.id.as_uuid(),
            "insurer_id": app.insurer.id.as_uuid(),
            "service_date": "2025-09-01",
            "purpose": "everything"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(app.gateway.calls(), 0);
}

#[tokio::test]
async fn test_prior_auth_create_send_poll_over_http() {
    let app = spawn_app().await;

    let response = app
        .server
        .post("/api/v1/priorauths")
        .json(&json!({
            "patient_id": app.patient.id.as_uuid(),
            "provider_id": app.provider.id.as_uuid(),
            "insurer_id": app.insurer.id.as_uuid(),
            "service_code": "D2740",
            "description": "ceramic crown",
            "requested_amount": "1500",
            "currency": "SAR"
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["status"], "draft");
    let auth_id = created["id"].as_str().unwrap().to_string();

    app.gateway.push_response(queued_response()).await;
    let response = app
        .server
        .post(&format!("/api/v1/priorauths/{}/send", auth_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let sent: Value = response.json();
    assert_eq!(sent["status"], "queued");

    let mut approval = MessageBundle::message();
    approval.push(Resource::ClaimResponse(ClaimResponseResource {
        request_identifier: None,
        outcome: "complete".to_string(),
        decision: Some("approved".to_string()),
        disposition: None,
        pre_auth_ref: Some("AUTH-2207".to_string()),
        pre_auth_period_end: NaiveDate::from_ymd_opt(2025, 12, 31),
        approved_amount: Some(dec!(1500)),
    }));
    app.gateway.push_response(approval).await;

    let response = app
        .server
        .post(&format!("/api/v1/priorauths/{}/poll", auth_id))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let polled: Value = response.json();
    assert_eq!(polled["status"], "approved");
    assert_eq!(polled["auth_number"], "AUTH-2207");
}
