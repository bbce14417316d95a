//! Core Kernel - Foundational types and utilities for the claims exchange system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers for claims, parties, and exchange artifacts
//! - The ports-and-adapters base types shared by every store and gateway

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{
    PatientId, ProviderId, InsurerId, ClaimId, ClaimItemId,
    CommunicationId, EligibilityId, PriorAuthId, BundleId,
};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
