//! Claim workflow handlers
//!
//! Each handler is one workflow action: the service performs a single
//! outbound round trip (or none, for an ineligible poll) and the updated
//! claim comes back to the caller.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use core_kernel::ClaimId;

use crate::dto::claims::ClaimBody;
use crate::error::ApiError;
use crate::AppState;

/// Submits a claim to the clearinghouse
pub async fn send_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimBody>, ApiError> {
    let claim = state.service.send_claim(ClaimId::from(id)).await?;
    Ok(Json(claim.into()))
}

/// Makes one status-inquiry round trip
pub async fn check_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimBody>, ApiError> {
    let claim = state.service.check_claim_status(ClaimId::from(id)).await?;
    Ok(Json(claim.into()))
}

/// Polls for a pending adjudication result
pub async fn poll_claim(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimBody>, ApiError> {
    let claim = state.service.poll_claim(ClaimId::from(id)).await?;
    Ok(Json(claim.into()))
}
