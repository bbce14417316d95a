//! Eligibility and prior-authorization handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{Currency, InsurerId, Money, PatientId, PriorAuthId, ProviderId};
use domain_coverage::{CoverageStore, EligibilityPurpose, PriorAuthorization};

use crate::dto::coverage::{
    CreatePriorAuthRequest, EligibilityBody, EligibilityRequest, PriorAuthBody,
};
use crate::error::ApiError;
use crate::AppState;

/// Makes one eligibility round trip against the clearinghouse
pub async fn check_eligibility(
    State(state): State<AppState>,
    Json(request): Json<EligibilityRequest>,
) -> Result<Json<EligibilityBody>, ApiError> {
    let purpose = EligibilityPurpose::from_code(&request.purpose)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown purpose '{}'", request.purpose)))?;

    let check = state
        .service
        .check_eligibility(
            PatientId::from(request.patient_id),
            ProviderId::from(request.provider_id),
            InsurerId::from(request.insurer_id),
            request.service_date,
            purpose,
        )
        .await?;
    Ok(Json(check.into()))
}

/// Creates a draft prior authorization
pub async fn create_prior_auth(
    State(state): State<AppState>,
    Json(request): Json<CreatePriorAuthRequest>,
) -> Result<(StatusCode, Json<PriorAuthBody>), ApiError> {
    request.validate()?;

    let currency = Currency::from_code(&request.currency)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let mut auth = PriorAuthorization::draft(
        PatientId::from(request.patient_id),
        ProviderId::from(request.provider_id),
        InsurerId::from(request.insurer_id),
        request.service_code,
        Money::new(request.requested_amount, currency),
    );
    auth.description = request.description;

    state.coverage.insert_prior_auth(&auth).await?;
    Ok((StatusCode::CREATED, Json(auth.into())))
}

/// Fetches a prior authorization
pub async fn get_prior_auth(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PriorAuthBody>, ApiError> {
    let auth = state.coverage.get_prior_auth(PriorAuthId::from(id)).await?;
    Ok(Json(auth.into()))
}

/// Submits a prior authorization to the clearinghouse
pub async fn send_prior_auth(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PriorAuthBody>, ApiError> {
    let auth = state.service.send_prior_auth(PriorAuthId::from(id)).await?;
    Ok(Json(auth.into()))
}

/// Polls for a pending prior-authorization decision
pub async fn poll_prior_auth(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PriorAuthBody>, ApiError> {
    let auth = state.service.poll_prior_auth(PriorAuthId::from(id)).await?;
    Ok(Json(auth.into()))
}
