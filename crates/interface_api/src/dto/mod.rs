//! Request data transfer objects

pub mod party;
pub mod query;
pub mod relationship;

pub use party::{OrganizationRequest, PartyFacts, PersonRequest};
pub use query::{CatalogQuery, ListQuery};
pub use relationship::{AssociationRequest, MandateRequest};
