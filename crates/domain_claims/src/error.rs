//! Claims domain errors

use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Claim amount must be positive")]
    NonPositiveAmount,
}
