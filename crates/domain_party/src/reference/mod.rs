//! Reference data
//!
//! Tenant- and locale-scoped catalogs of valid codes. Party facts refer to
//! catalog rows by code; the service checks those codes against a
//! `CatalogIndex` built from the tenant's catalogs.

pub mod catalog;
pub mod filter;
pub mod item;
pub mod pattern;
pub mod types;

pub use catalog::{
    AssociationType, CatalogEntry, CatalogKind, ConsentType, ExternalReferenceType, Gender,
    IdentityDocumentType, IndustryClassificationCategory, LockType, MandataryRole, MandataryType,
    PhysicalAddressRole, PhysicalAddressType, PreferenceTypeCategory, QualificationType,
    ReferenceData, ResidencyStatus, ResidentialType, RoleType, Segment, StatusType,
};
pub use filter::PartyTypeFilter;
pub use item::{CatalogIndex, CatalogViolation, ReferenceItem};
pub use pattern::CompiledPattern;
pub use types::{AttributeType, MandatePropertyType, PreferenceType, TaxNumberType};
