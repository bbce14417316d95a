//! Claims Domain
//!
//! This crate implements the claim lifecycle from draft entry through
//! submission to the clearinghouse and poll-driven adjudication.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Draft -> Queued -> Approved/Denied
//!   |        |
//!   v        v
//! Error <- Error  (re-send allowed from Error)
//! ```

pub mod claim;
pub mod error;
pub mod ports;

pub use claim::{Claim, ClaimStatus, ClaimType, ClaimItem, Diagnosis, DiagnosisKind};
pub use error::ClaimError;
pub use ports::ClaimStore;
