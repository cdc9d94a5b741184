//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence for the party master-data
//! system using SQLx.
//!
//! # Architecture
//!
//! The crate follows the repository pattern:
//!
//! - `repositories`: SQL over `parties`, the `party_*` child tables,
//!   associations, mandates, audit rows and reference data
//! - `adapters`: `PostgresPartyStore`, which implements the domain's storage
//!   ports on top of the repositories
//!
//! The schema lives in the workspace `migrations/` directory and is applied
//! with [`run_migrations`].
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresPartyStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/party")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresPartyStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::PostgresPartyStore;
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
