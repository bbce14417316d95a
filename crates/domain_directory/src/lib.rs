//! Directory Domain
//!
//! Reference records for the parties a claim points at: the patient who
//! received care, the provider who rendered it, and the insurer who pays.
//! These records feed the bundle builder; they are managed as library
//! operations, not as a public CRUD surface.

pub mod patient;
pub mod provider;
pub mod insurer;
pub mod ports;

pub use patient::{Patient, Gender};
pub use provider::{Provider, ProviderKind};
pub use insurer::Insurer;
pub use ports::DirectoryStore;
