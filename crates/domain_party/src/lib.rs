//! Party Master Data Domain
//!
//! This crate manages persons and organizations (parties) for many tenants:
//! their identifying details, the time-bound child facts recorded about
//! them, the associations and mandates between them, and the reference
//! catalogs that govern which codes may be used.
//!
//! # Model
//!
//! - **Party**: root aggregate, either a `Person` or an `Organization`
//! - **Child facts**: attributes, contact mechanisms, documents, statuses,
//!   segments, consents and more, each keyed by its owner plus type code
//! - **Association**: typed, directed relationship between two parties
//! - **Mandate**: authorization for mandataries to act for a party
//! - **Reference data**: tenant- and locale-scoped code catalogs, some
//!   restricted to particular party types
//! - **Snapshots / history**: append-only audit rows written on every
//!   party change
//!
//! # Examples
//!
//! ```rust
//! use domain_party::party::{Organization, Party};
//! use domain_party::status::PartySegment;
//! use domain_party::reference::{CatalogEntry, CatalogIndex, PartyTypeFilter, ReferenceItem, Segment};
//! use domain_party::validation::PartyValidator;
//! use domain_party::PartyType;
//! use core_kernel::TenantId;
//!
//! let tenant = TenantId::new();
//! let mut acme = Party::new_organization(tenant, Organization::new("Acme"));
//! acme.segments.upsert(PartySegment::new(acme.id, "RETAIL"));
//!
//! // RETAIL is only valid for persons in this tenant
//! let retail = Segment::new(
//!     CatalogEntry::new(tenant, "en".parse().unwrap(), "RETAIL", "Retail customers"),
//!     PartyTypeFilter::for_party_types(&[PartyType::Person]),
//! );
//! let catalogs: CatalogIndex = vec![ReferenceItem::from(retail)].into_iter().collect();
//!
//! let result = PartyValidator::validate_against_catalogs(&acme, &catalogs);
//! assert!(!result.is_valid);
//! ```

pub mod association;
pub mod attribute;
pub mod child;
pub mod consent;
pub mod contact_mechanism;
pub mod document;
pub mod error;
pub mod funds;
pub mod mandate;
pub mod party;
pub mod ports;
pub mod profile;
pub mod reference;
pub mod results;
pub mod service;
pub mod snapshot;
pub mod status;
pub mod validation;

pub use association::Association;
pub use attribute::{Attribute, AttributeDataType, AttributeValue};
pub use child::{ChildEntity, ChildSet, TimeBound};
pub use consent::{Consent, Preference};
pub use contact_mechanism::{
    ContactMechanism, ContactMechanismSubType, ContactMechanismType, ContactMechanismValue,
    PhysicalAddress, TelephoneNumber,
};
pub use document::{ExternalReference, IdentityDocument, TaxNumber};
pub use error::{EntityKind, PartyError};
pub use funds::{SourceOfFunds, SourceOfWealth};
pub use mandate::{Mandatary, Mandate, MandateProperty, PropertyViolation};
pub use party::{Organization, Party, PartyDetails, PartySummary, PartyType, Person};
pub use ports::{PartyDataStore, PartyQuery, ReferenceDataStore};
#[cfg(any(test, feature = "mock"))]
pub use ports::mock::InMemoryPartyStore;
pub use profile::{IndustryClassification, LanguageProficiency, ProficiencyLevel, Skill};
pub use results::{AssociationsForParty, Organizations, Parties, PartySnapshots, Persons, Snapshots};
pub use service::{PartyService, RequestContext};
pub use snapshot::{ChangeKind, PartyAudit, PartyHistory, PartySnapshot};
pub use status::{Lock, PartyRole, PartySegment, Status};
pub use validation::{PartyValidator, ValidationResult};
