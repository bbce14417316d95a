//! Communication relay handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::ClaimId;

use crate::dto::communications::{CommunicationBody, SendCommunicationRequest};
use crate::error::ApiError;
use crate::AppState;

/// Sends caller-supplied payloads to the clearinghouse
pub async fn send_communication(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendCommunicationRequest>,
) -> Result<Json<CommunicationBody>, ApiError> {
    request.validate()?;

    let payloads = request.payloads.into_iter().map(Into::into).collect();
    let communication = state
        .service
        .send_communication(ClaimId::from(id), payloads)
        .await?;
    Ok(Json(communication.into()))
}

/// Polls for acknowledgments and inbound requests
pub async fn poll_communications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CommunicationBody>>, ApiError> {
    let communications = state.service.poll_communications(ClaimId::from(id)).await?;
    Ok(Json(communications.into_iter().map(Into::into).collect()))
}

/// Lists communications for a claim in creation order
pub async fn list_communications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CommunicationBody>>, ApiError> {
    let communications = state.service.list_communications(ClaimId::from(id)).await?;
    Ok(Json(communications.into_iter().map(Into::into).collect()))
}
