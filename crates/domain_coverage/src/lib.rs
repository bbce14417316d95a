//! Coverage Domain
//!
//! Eligibility checks (is this patient covered today?) and prior
//! authorizations (pre-approval for a planned service). Prior
//! authorizations are distinct from claims but follow the same
//! submit-then-poll exchange against the clearinghouse.

pub mod eligibility;
pub mod prior_auth;
pub mod ports;
pub mod error;

pub use eligibility::{EligibilityCheck, EligibilityPurpose, EligibilityOutcome};
pub use prior_auth::{PriorAuthorization, AuthStatus};
pub use ports::CoverageStore;
pub use error::CoverageError;
