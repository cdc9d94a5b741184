//! Repository implementations
//!
//! Repositories speak SQL and return `DatabaseError`; the adapters in
//! `crate::adapters` translate them to the domain ports.

pub mod audit;
pub mod children;
pub mod party;
pub mod reference;
pub mod relationship;

pub use audit::AuditRepository;
pub use party::PartyRepository;
pub use reference::ReferenceRepository;
pub use relationship::{AssociationRepository, MandateRepository};
