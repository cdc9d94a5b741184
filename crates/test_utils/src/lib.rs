//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! party master-data test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built parties, catalogs and request contexts
//! - `builders`: Builder patterns for parties and mandates
//! - `database`: PostgreSQL test container management
//! - `assertions`: Assertion helpers for pages, periods and child facts
//! - `generators`: Property-based test data generators

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
