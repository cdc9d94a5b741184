//! Core Kernel - Foundational types for the party master-data system
//!
//! This crate provides the building blocks shared by every other crate:
//! - Strongly-typed identifiers for aggregates and audit rows
//! - Effective-date periods and lifecycle audit stamps
//! - Pagination and sort envelopes for list results
//! - Port error, health and metadata types for the hexagonal boundary

pub mod temporal;
pub mod identifiers;
pub mod pagination;
pub mod ports;
pub mod error;

pub use temporal::{EffectivePeriod, AuditStamps, TemporalError};
pub use identifiers::{
    PartyId, TenantId, AssociationId, MandateId, SnapshotId, HistoryId,
};
pub use pagination::{Page, PageRequest, SortOrder, SortDirection};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
pub use error::CoreError;
