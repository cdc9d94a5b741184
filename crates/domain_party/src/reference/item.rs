//! Catalog rows as one storable type, and an index for code checks

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unic_langid::LanguageIdentifier;
use validator::{Validate, ValidationErrors};

use core_kernel::TenantId;

use crate::attribute::AttributeDataType;
use crate::party::PartyType;

use super::catalog::*;
use super::filter::PartyTypeFilter;
use super::types::*;

macro_rules! reference_items {
    ($($variant:ident),+ $(,)?) => {
        /// Any catalog row, tagged with its catalog name
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(tag = "catalog", rename_all = "snake_case")]
        pub enum ReferenceItem {
            $($variant($variant),)+
        }

        impl ReferenceItem {
            fn as_reference(&self) -> &dyn ReferenceData {
                match self {
                    $(ReferenceItem::$variant(row) => row as &dyn ReferenceData,)+
                }
            }

            /// Runs the field-level constraints of the wrapped row
            pub fn validate_fields(&self) -> Result<(), ValidationErrors> {
                match self {
                    $(ReferenceItem::$variant(row) => row.validate(),)+
                }
            }
        }

        $(
            impl From<$variant> for ReferenceItem {
                fn from(row: $variant) -> Self {
                    ReferenceItem::$variant(row)
                }
            }
        )+
    };
}

reference_items!(
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
);

impl ReferenceItem {
    pub fn tenant_id(&self) -> TenantId {
        self.entry().tenant_id
    }

    pub fn locale(&self) -> &LanguageIdentifier {
        &self.entry().locale
    }

    pub fn sort_index(&self) -> i32 {
        self.entry().sort_index
    }
}

impl ReferenceData for ReferenceItem {
    fn kind(&self) -> CatalogKind {
        self.as_reference().kind()
    }

    fn entry(&self) -> &CatalogEntry {
        self.as_reference().entry()
    }

    fn party_type_filter(&self) -> Option<&PartyTypeFilter> {
        self.as_reference().party_type_filter()
    }
}

/// Why a code was rejected by a catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogViolation {
    #[error("unknown {kind} code '{code}'")]
    UnknownCode { kind: CatalogKind, code: String },

    #[error("{kind} code '{code}' is not valid for party type {party_type}")]
    NotValidForPartyType {
        kind: CatalogKind,
        code: String,
        party_type: PartyType,
    },
}

/// Lookup of loaded catalog codes
///
/// A catalog with no loaded rows is not enforced: `check` accepts any code
/// for it. Once a catalog has rows, only those codes pass.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    codes: HashMap<(CatalogKind, String), Option<PartyTypeFilter>>,
    loaded: HashSet<CatalogKind>,
    attribute_types: HashMap<String, AttributeDataType>,
    mandate_property_types: Vec<MandatePropertyType>,
    tax_number_types: HashMap<String, TaxNumberType>,
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, item: &ReferenceItem) {
        let kind = item.kind();
        self.loaded.insert(kind);
        self.codes
            .insert((kind, item.code().to_string()), item.party_type_filter().cloned());
        match item {
            ReferenceItem::AttributeType(row) => {
                self.attribute_types.insert(row.entry.code.clone(), row.data_type);
            }
            ReferenceItem::MandatePropertyType(row) => {
                self.mandate_property_types.retain(|existing| existing.entry.code != row.entry.code);
                self.mandate_property_types.push(row.clone());
            }
            ReferenceItem::TaxNumberType(row) => {
                self.tax_number_types.insert(row.entry.code.clone(), row.clone());
            }
            _ => {}
        }
    }

    /// Returns true if any row of `kind` has been loaded
    pub fn is_loaded(&self, kind: CatalogKind) -> bool {
        self.loaded.contains(&kind)
    }

    pub fn contains(&self, kind: CatalogKind, code: &str) -> bool {
        self.codes.contains_key(&(kind, code.to_string()))
    }

    /// Checks that `code` exists in `kind` and may be used for `party_type`
    pub fn check(
        &self,
        kind: CatalogKind,
        code: &str,
        party_type: PartyType,
    ) -> Result<(), CatalogViolation> {
        if !self.is_loaded(kind) {
            return Ok(());
        }
        match self.codes.get(&(kind, code.to_string())) {
            None => Err(CatalogViolation::UnknownCode { kind, code: code.to_string() }),
            Some(Some(filter)) if !filter.allows(party_type) => {
                Err(CatalogViolation::NotValidForPartyType {
                    kind,
                    code: code.to_string(),
                    party_type,
                })
            }
            Some(_) => Ok(()),
        }
    }

    /// Checks that `code` exists in `kind`, ignoring party-type filters
    pub fn check_code(&self, kind: CatalogKind, code: &str) -> Result<(), CatalogViolation> {
        if !self.is_loaded(kind) || self.contains(kind, code) {
            Ok(())
        } else {
            Err(CatalogViolation::UnknownCode { kind, code: code.to_string() })
        }
    }

    /// The declared value type of an attribute code
    pub fn attribute_data_type(&self, code: &str) -> Option<AttributeDataType> {
        self.attribute_types.get(code).copied()
    }

    pub fn mandate_property_types(&self) -> &[MandatePropertyType] {
        &self.mandate_property_types
    }

    pub fn tax_number_type(&self, code: &str) -> Option<&TaxNumberType> {
        self.tax_number_types.get(code)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl FromIterator<ReferenceItem> for CatalogIndex {
    fn from_iter<I: IntoIterator<Item = ReferenceItem>>(iter: I) -> Self {
        let mut index = Self::new();
        for item in iter {
            index.insert(&item);
        }
        index
    }
}

impl<'a> FromIterator<&'a ReferenceItem> for CatalogIndex {
    fn from_iter<I: IntoIterator<Item = &'a ReferenceItem>>(iter: I) -> Self {
        let mut index = Self::new();
        for item in iter {
            index.insert(item);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(code: &str) -> CatalogEntry {
        CatalogEntry::new(TenantId::new(), "en".parse().unwrap(), code, "")
    }

    #[test]
    fn test_item_wire_tag_is_catalog_name() {
        let item: ReferenceItem = Gender::new(entry("F")).into();
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["catalog"], "gender");
        assert_eq!(json["code"], "F");

        let restored: ReferenceItem = serde_json::from_value(json).unwrap();
        assert_eq!(restored, item);
        assert_eq!(restored.kind(), CatalogKind::Gender);
    }

    #[test]
    fn test_scoped_item_round_trips_through_json() {
        let item: ReferenceItem =
            StatusType::new(entry("ACTIVE"), PartyTypeFilter::from_codes(&["PERSON", "ORGANIZATION"])).into();
        let json = serde_json::to_string(&item).unwrap();
        let restored: ReferenceItem = serde_json::from_str(&json).unwrap();
        assert!(restored.is_valid_for_party_type("ORGANIZATION"));
        assert_eq!(restored, item);
    }

    #[test]
    fn test_index_check() {
        let index: CatalogIndex = vec![
            ReferenceItem::from(StatusType::new(entry("DECEASED"), PartyTypeFilter::from_codes(&["PERSON"]))),
            ReferenceItem::from(StatusType::new(entry("ACTIVE"), PartyTypeFilter::for_party_types(PartyType::all()))),
        ]
        .into_iter()
        .collect();

        assert!(index.check(CatalogKind::StatusType, "ACTIVE", PartyType::Organization).is_ok());
        assert!(index.check(CatalogKind::StatusType, "DECEASED", PartyType::Person).is_ok());
        assert_eq!(
            index.check(CatalogKind::StatusType, "DECEASED", PartyType::Organization),
            Err(CatalogViolation::NotValidForPartyType {
                kind: CatalogKind::StatusType,
                code: "DECEASED".to_string(),
                party_type: PartyType::Organization,
            })
        );
        assert!(matches!(
            index.check(CatalogKind::StatusType, "MISSING", PartyType::Person),
            Err(CatalogViolation::UnknownCode { .. })
        ));
    }

    #[test]
    fn test_unloaded_catalog_is_not_enforced() {
        let index = CatalogIndex::new();
        assert!(index.check(CatalogKind::LockType, "ANY", PartyType::Person).is_ok());
        assert!(index.check_code(CatalogKind::Gender, "ANY").is_ok());
    }

    #[test]
    fn test_index_keeps_mandate_property_types() {
        let index: CatalogIndex = vec![
            ReferenceItem::from(MandatePropertyType::new(entry("LIMIT"), Some(r"\d+".into()))),
            ReferenceItem::from(MandatePropertyType::new(entry("LIMIT"), Some(r"\d{1,3}".into()))),
        ]
        .into_iter()
        .collect();
        assert_eq!(index.mandate_property_types().len(), 1);
        assert_eq!(index.mandate_property_types()[0].pattern(), Some(r"\d{1,3}"));
    }
}
