//! Catalog rows with columns beyond the common header

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::attribute::AttributeDataType;

use super::catalog::{CatalogEntry, CatalogKind, ReferenceData};
use super::filter::PartyTypeFilter;
use super::pattern::CompiledPattern;

/// Defines an attribute a party may carry and the type of its value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttributeType {
    #[serde(flatten)]
    #[validate(nested)]
    pub entry: CatalogEntry,
    #[serde(default)]
    pub party_types: PartyTypeFilter,
    pub data_type: AttributeDataType,
}

impl AttributeType {
    pub fn new(entry: CatalogEntry, party_types: PartyTypeFilter, data_type: AttributeDataType) -> Self {
        Self { entry, party_types, data_type }
    }

    pub fn set_party_types<S: AsRef<str>>(&mut self, codes: &[S]) {
        self.party_types = PartyTypeFilter::from_codes(codes);
    }

    pub fn party_types(&self) -> Vec<String> {
        self.party_types.codes()
    }
}

impl ReferenceData for AttributeType {
    fn kind(&self) -> CatalogKind {
        CatalogKind::AttributeType
    }

    fn entry(&self) -> &CatalogEntry {
        &self.entry
    }

    fn party_type_filter(&self) -> Option<&PartyTypeFilter> {
        Some(&self.party_types)
    }
}

/// A preference a party can express, grouped by category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceType {
    #[serde(flatten)]
    #[validate(nested)]
    pub entry: CatalogEntry,
    #[serde(default)]
    pub party_types: PartyTypeFilter,
    /// Code of a `PreferenceTypeCategory` row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PreferenceType {
    pub fn new(entry: CatalogEntry, party_types: PartyTypeFilter) -> Self {
        Self { entry, party_types, category: None }
    }

    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn set_party_types<S: AsRef<str>>(&mut self, codes: &[S]) {
        self.party_types = PartyTypeFilter::from_codes(codes);
    }

    pub fn party_types(&self) -> Vec<String> {
        self.party_types.codes()
    }
}

impl ReferenceData for PreferenceType {
    fn kind(&self) -> CatalogKind {
        CatalogKind::PreferenceType
    }

    fn entry(&self) -> &CatalogEntry {
        &self.entry
    }

    fn party_type_filter(&self) -> Option<&PartyTypeFilter> {
        Some(&self.party_types)
    }
}

/// A kind of tax identifier, optionally tied to a country and a format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaxNumberType {
    #[serde(flatten)]
    #[validate(nested)]
    pub entry: CatalogEntry,
    #[serde(default)]
    pub party_types: PartyTypeFilter,
    /// ISO 3166-1 alpha-2 country the identifier is issued in
    #[validate(length(equal = 2))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default)]
    pub pattern: CompiledPattern,
}

impl TaxNumberType {
    pub fn new(entry: CatalogEntry, party_types: PartyTypeFilter) -> Self {
        Self {
            entry,
            party_types,
            country: None,
            pattern: CompiledPattern::default(),
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = CompiledPattern::new(Some(pattern.into()));
        self
    }

    pub fn set_party_types<S: AsRef<str>>(&mut self, codes: &[S]) {
        self.party_types = PartyTypeFilter::from_codes(codes);
    }

    pub fn party_types(&self) -> Vec<String> {
        self.party_types.codes()
    }

    /// Returns true if `tax_number` has the format this type requires
    pub fn accepts(&self, tax_number: &str) -> Result<bool, regex::Error> {
        self.pattern.accepts(tax_number)
    }
}

impl ReferenceData for TaxNumberType {
    fn kind(&self) -> CatalogKind {
        CatalogKind::TaxNumberType
    }

    fn entry(&self) -> &CatalogEntry {
        &self.entry
    }

    fn party_type_filter(&self) -> Option<&PartyTypeFilter> {
        Some(&self.party_types)
    }
}

/// A property that may be set on a mandate, with an optional value format
///
/// The pattern is compiled on first use and cached on the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MandatePropertyType {
    #[serde(flatten)]
    #[validate(nested)]
    pub entry: CatalogEntry,
    #[serde(default)]
    pub pattern: CompiledPattern,
    /// Whether every mandate must carry this property
    #[serde(default)]
    pub required: bool,
}

impl MandatePropertyType {
    pub fn new(entry: CatalogEntry, pattern: Option<String>) -> Self {
        Self {
            entry,
            pattern: CompiledPattern::new(pattern),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.source()
    }

    pub fn set_pattern(&mut self, pattern: Option<String>) {
        self.pattern.set_source(pattern);
    }

    /// Returns the compiled pattern, compiling and caching it on first call
    pub fn compiled_pattern(&self) -> Result<Option<&Regex>, regex::Error> {
        self.pattern.compiled()
    }

    /// Returns true if `value` is acceptable for this property
    pub fn accepts(&self, value: &str) -> Result<bool, regex::Error> {
        self.pattern.accepts(value)
    }
}

impl ReferenceData for MandatePropertyType {
    fn kind(&self) -> CatalogKind {
        CatalogKind::MandatePropertyType
    }

    fn entry(&self) -> &CatalogEntry {
        &self.entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::TenantId;

    fn entry(code: &str) -> CatalogEntry {
        CatalogEntry::new(TenantId::new(), "en".parse().unwrap(), code, "")
    }

    #[test]
    fn test_mandate_property_pattern_is_memoized() {
        let row = MandatePropertyType::new(entry("IBAN"), Some("[A-Z]{2}[0-9]{2}[A-Z0-9]{4,30}".into()));
        let first = row.compiled_pattern().unwrap().unwrap() as *const Regex;
        let second = row.compiled_pattern().unwrap().unwrap() as *const Regex;
        assert_eq!(first, second);
        assert!(row.accepts("GB82WEST12345698765432").unwrap());
        assert!(!row.accepts("not an iban").unwrap());
    }

    #[test]
    fn test_mandate_property_survives_json() {
        let row = MandatePropertyType::new(entry("LIMIT"), Some(r"\d+".into())).required();
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["pattern"], r"\d+");
        assert_eq!(json["required"], true);

        let restored: MandatePropertyType = serde_json::from_value(json).unwrap();
        assert_eq!(restored, row);
        assert!(restored.accepts("100").unwrap());
    }

    #[test]
    fn test_tax_number_type() {
        let row = TaxNumberType::new(entry("VAT"), PartyTypeFilter::from_codes(&["ORGANIZATION"]))
            .with_country("BE")
            .with_pattern(r"BE0\d{9}");
        assert!(row.validate().is_ok());
        assert!(row.accepts("BE0123456789").unwrap());
        assert!(!row.accepts("BE123").unwrap());
        assert!(row.is_valid_for_party_type("ORGANIZATION"));
        assert!(!row.is_valid_for_party_type("PERSON"));
    }

    #[test]
    fn test_attribute_type_set_party_types() {
        let mut row = AttributeType::new(entry("SHOE_SIZE"), PartyTypeFilter::default(), AttributeDataType::Integer);
        row.set_party_types(&["PERSON"]);
        assert_eq!(row.party_types(), vec!["PERSON"]);
        assert_eq!(row.kind(), CatalogKind::AttributeType);
    }
}
