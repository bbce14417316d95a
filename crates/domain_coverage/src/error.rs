//! Coverage domain errors

use thiserror::Error;

/// Errors that can occur in the coverage domain
#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    #[error("Requested amount must be positive")]
    NonPositiveAmount,
}
