//! Repository implementations
//!
//! PostgreSQL adapters for the domain store ports.

pub mod directory;
pub mod claims;
pub mod communications;
pub mod coverage;

pub use directory::DirectoryRepository;
pub use claims::ClaimsRepository;
pub use communications::CommunicationsRepository;
pub use coverage::CoverageRepository;
