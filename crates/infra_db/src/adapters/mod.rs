//! Domain Adapters
//!
//! This module provides adapter implementations for domain ports,
//! connecting domain interfaces to the PostgreSQL database layer.
//!
//! # Architecture
//!
//! Each adapter:
//! - Implements the domain's port traits
//! - Uses the repository layer for database operations
//! - Translates `DatabaseError` into `PortError`

pub mod party;

pub use party::PostgresPartyStore;
