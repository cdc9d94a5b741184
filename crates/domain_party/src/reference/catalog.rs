//! Reference-data catalogs
//!
//! Every catalog row shares the same header: the owning tenant, the locale
//! the description is written in, the code other entities refer to, and a
//! sort index for presentation. Catalogs differ only in the extra columns
//! they add, most commonly a party-type filter.

use std::fmt;

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;
use validator::Validate;

use core_kernel::TenantId;

use super::filter::PartyTypeFilter;

/// Common columns of every catalog row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub tenant_id: TenantId,
    pub locale: LanguageIdentifier,
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(max = 255))]
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_index: i32,
}

impl CatalogEntry {
    pub fn new(
        tenant_id: TenantId,
        locale: LanguageIdentifier,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            locale,
            code: code.into(),
            description: description.into(),
            sort_index: 0,
        }
    }

    pub fn with_sort_index(mut self, sort_index: i32) -> Self {
        self.sort_index = sort_index;
        self
    }
}

/// Identifies a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    AssociationType,
    AttributeType,
    ConsentType,
    ExternalReferenceType,
    Gender,
    IdentityDocumentType,
    IndustryClassificationCategory,
    LockType,
    MandataryRole,
    MandataryType,
    MandatePropertyType,
    PhysicalAddressRole,
    PhysicalAddressType,
    PreferenceType,
    PreferenceTypeCategory,
    QualificationType,
    ResidencyStatus,
    ResidentialType,
    RoleType,
    Segment,
    StatusType,
    TaxNumberType,
}

impl CatalogKind {
    const ALL: [CatalogKind; 22] = [
        CatalogKind::AssociationType,
        CatalogKind::AttributeType,
        CatalogKind::ConsentType,
        CatalogKind::ExternalReferenceType,
        CatalogKind::Gender,
        CatalogKind::IdentityDocumentType,
        CatalogKind::IndustryClassificationCategory,
        CatalogKind::LockType,
        CatalogKind::MandataryRole,
        CatalogKind::MandataryType,
        CatalogKind::MandatePropertyType,
        CatalogKind::PhysicalAddressRole,
        CatalogKind::PhysicalAddressType,
        CatalogKind::PreferenceType,
        CatalogKind::PreferenceTypeCategory,
        CatalogKind::QualificationType,
        CatalogKind::ResidencyStatus,
        CatalogKind::ResidentialType,
        CatalogKind::RoleType,
        CatalogKind::Segment,
        CatalogKind::StatusType,
        CatalogKind::TaxNumberType,
    ];

    /// Every catalog, in name order
    pub fn all() -> &'static [CatalogKind] {
        &Self::ALL
    }

    /// The stable snake_case name used in URLs and the `catalog` column
    pub fn name(&self) -> &'static str {
        match self {
            CatalogKind::AssociationType => "association_type",
            CatalogKind::AttributeType => "attribute_type",
            CatalogKind::ConsentType => "consent_type",
            CatalogKind::ExternalReferenceType => "external_reference_type",
            CatalogKind::Gender => "gender",
            CatalogKind::IdentityDocumentType => "identity_document_type",
            CatalogKind::IndustryClassificationCategory => "industry_classification_category",
            CatalogKind::LockType => "lock_type",
            CatalogKind::MandataryRole => "mandatary_role",
            CatalogKind::MandataryType => "mandatary_type",
            CatalogKind::MandatePropertyType => "mandate_property_type",
            CatalogKind::PhysicalAddressRole => "physical_address_role",
            CatalogKind::PhysicalAddressType => "physical_address_type",
            CatalogKind::PreferenceType => "preference_type",
            CatalogKind::PreferenceTypeCategory => "preference_type_category",
            CatalogKind::QualificationType => "qualification_type",
            CatalogKind::ResidencyStatus => "residency_status",
            CatalogKind::ResidentialType => "residential_type",
            CatalogKind::RoleType => "role_type",
            CatalogKind::Segment => "segment",
            CatalogKind::StatusType => "status_type",
            CatalogKind::TaxNumberType => "tax_number_type",
        }
    }

    pub fn from_name(name: &str) -> Option<CatalogKind> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Returns true for catalogs whose rows carry a party-type filter
    pub fn is_party_type_scoped(&self) -> bool {
        matches!(
            self,
            CatalogKind::AssociationType
                | CatalogKind::AttributeType
                | CatalogKind::ConsentType
                | CatalogKind::ExternalReferenceType
                | CatalogKind::IdentityDocumentType
                | CatalogKind::LockType
                | CatalogKind::PreferenceType
                | CatalogKind::RoleType
                | CatalogKind::Segment
                | CatalogKind::StatusType
                | CatalogKind::TaxNumberType
        )
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behaviour shared by every catalog row type
pub trait ReferenceData {
    fn kind(&self) -> CatalogKind;

    fn entry(&self) -> &CatalogEntry;

    /// The party-type filter, for catalogs that carry one
    fn party_type_filter(&self) -> Option<&PartyTypeFilter> {
        None
    }

    fn code(&self) -> &str {
        &self.entry().code
    }

    /// Returns true if the row may be used for a party of type `code`
    ///
    /// Rows of unscoped catalogs are valid for every party type. Rows of
    /// scoped catalogs are valid only for the listed types.
    fn is_valid_for_party_type(&self, code: &str) -> bool {
        match self.party_type_filter() {
            Some(filter) => filter.is_valid_for_party_type(code),
            None => true,
        }
    }
}

/// Declares a catalog row type over `CatalogEntry`
///
/// The `party_scoped` form adds a `party_types` column.
macro_rules! define_catalog {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(flatten)]
            #[validate(nested)]
            pub entry: CatalogEntry,
        }

        impl $name {
            pub fn new(entry: CatalogEntry) -> Self {
                Self { entry }
            }
        }

        impl ReferenceData for $name {
            fn kind(&self) -> CatalogKind {
                CatalogKind::$name
            }

            fn entry(&self) -> &CatalogEntry {
                &self.entry
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, party_scoped) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(flatten)]
            #[validate(nested)]
            pub entry: CatalogEntry,
            #[serde(default)]
            pub party_types: PartyTypeFilter,
        }

        impl $name {
            pub fn new(entry: CatalogEntry, party_types: PartyTypeFilter) -> Self {
                Self { entry, party_types }
            }

            /// Replaces the valid party types
            pub fn set_party_types<S: AsRef<str>>(&mut self, codes: &[S]) {
                self.party_types = PartyTypeFilter::from_codes(codes);
            }

            /// Returns the valid party types in stored order
            pub fn party_types(&self) -> Vec<String> {
                self.party_types.codes()
            }
        }

        impl ReferenceData for $name {
            fn kind(&self) -> CatalogKind {
                CatalogKind::$name
            }

            fn entry(&self) -> &CatalogEntry {
                &self.entry
            }

            fn party_type_filter(&self) -> Option<&PartyTypeFilter> {
                Some(&self.party_types)
            }
        }
    };
}

define_catalog!(
    /// Kinds of relationship between two parties
    AssociationType, party_scoped
);
define_catalog!(ConsentType, party_scoped);
define_catalog!(ExternalReferenceType, party_scoped);
define_catalog!(IdentityDocumentType, party_scoped);
define_catalog!(
    /// Reasons a party can be blocked from use
    LockType, party_scoped
);
define_catalog!(RoleType, party_scoped);
define_catalog!(
    /// Commercial segments a party can be placed in
    Segment, party_scoped
);
define_catalog!(StatusType, party_scoped);

define_catalog!(Gender);
define_catalog!(IndustryClassificationCategory);
define_catalog!(
    /// Roles a mandatary plays under a mandate (signatory, attorney, ...)
    MandataryRole
);
define_catalog!(MandataryType);
define_catalog!(PhysicalAddressRole);
define_catalog!(PhysicalAddressType);
define_catalog!(PreferenceTypeCategory);
define_catalog!(
    /// Degrees, certificates and other skills
    QualificationType
);
define_catalog!(ResidencyStatus);
define_catalog!(ResidentialType);

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str) -> CatalogEntry {
        CatalogEntry::new(TenantId::new(), "en-GB".parse().unwrap(), code, "description")
    }

    #[test]
    fn test_kind_names_round_trip() {
        assert_eq!(CatalogKind::all().len(), 22);
        for kind in CatalogKind::all() {
            assert_eq!(CatalogKind::from_name(kind.name()), Some(*kind));
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
        assert_eq!(CatalogKind::from_name("nope"), None);
    }

    #[test]
    fn test_set_party_types_round_trip() {
        let mut status = StatusType::new(entry("DECEASED"), PartyTypeFilter::default());
        assert!(!status.is_valid_for_party_type("PERSON"));

        status.set_party_types(&["PERSON"]);
        assert_eq!(status.party_types(), vec!["PERSON"]);
        assert!(status.is_valid_for_party_type("PERSON"));
        assert!(!status.is_valid_for_party_type("ORGANIZATION"));
    }

    #[test]
    fn test_unscoped_catalog_is_valid_for_everyone() {
        let gender = Gender::new(entry("F"));
        assert_eq!(gender.kind(), CatalogKind::Gender);
        assert!(gender.party_type_filter().is_none());
        assert!(gender.is_valid_for_party_type("ORGANIZATION"));
    }

    #[test]
    fn test_scoped_wire_form() {
        let segment = Segment::new(entry("RETAIL"), PartyTypeFilter::from_codes(&["PERSON"]));
        let json = serde_json::to_value(&segment).unwrap();
        assert_eq!(json["code"], "RETAIL");
        assert_eq!(json["locale"], "en-GB");
        assert_eq!(json["partyTypes"], serde_json::json!(["PERSON"]));

        let restored: Segment = serde_json::from_value(json).unwrap();
        assert_eq!(restored, segment);
    }

    #[test]
    fn test_entry_validation() {
        let mut row = entry("");
        assert!(row.validate().is_err());
        row.code = "X".repeat(51);
        assert!(row.validate().is_err());
        row.code = "OK".to_string();
        assert!(row.validate().is_ok());
    }
}
