//! Clearinghouse Exchange Domain
//!
//! Everything that crosses the wire to the national clearinghouse lives
//! here: the FHIR-style bundle types, the builders that map stored records
//! into them, the gateway port and its HTTP adapter, communication records,
//! and the `SubmissionService` that orchestrates send / status-check / poll.
//!
//! Each workflow operation is one synchronous round trip: load the row,
//! build a message, make exactly one outbound call, parse one response,
//! write the result back. There is no retry, no backoff, and no queueing;
//! a queued claim advances only when an operator invokes poll again.

pub mod bundle;
pub mod builder;
pub mod outcome;
pub mod communication;
pub mod ports;
pub mod client;
pub mod service;

pub use bundle::{MessageBundle, BundleEntry, Resource};
pub use builder::BuildError;
pub use outcome::{ClaimDisposition, AuthDisposition};
pub use communication::{Communication, CommunicationPayload, Direction, AckStatus, CommunicationStore};
pub use ports::ExchangeGateway;
pub use client::{NphiesClient, NphiesConfig};
pub use service::SubmissionService;
