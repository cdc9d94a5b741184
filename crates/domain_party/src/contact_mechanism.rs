//! Contact mechanisms: postal addresses, telephone numbers and electronic
//! addresses
//!
//! Each mechanism is classified by a `ContactMechanismSubType`, a fixed list
//! that also carries the numeric codes used by older feeds.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{EffectivePeriod, PartyId};

use crate::child::{impl_party_child, impl_time_bound};

/// The broad family a contact mechanism belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactMechanismType {
    PhysicalAddress,
    Telephone,
    Electronic,
}

/// The specific kind of contact mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactMechanismSubType {
    HomeAddress,
    WorkAddress,
    PostalAddress,
    RegisteredAddress,
    HomePhone,
    WorkPhone,
    MobilePhone,
    Fax,
    PersonalEmail,
    WorkEmail,
    Website,
    SocialMedia,
}

use ContactMechanismSubType as Sub;
use ContactMechanismType as Kind;

/// (sub-type, string code, numeric code, parent type)
static SUB_TYPES: [(Sub, &str, u16, Kind); 12] = [
    (Sub::HomeAddress, "HOME_ADDRESS", 1, Kind::PhysicalAddress),
    (Sub::WorkAddress, "WORK_ADDRESS", 2, Kind::PhysicalAddress),
    (Sub::PostalAddress, "POSTAL_ADDRESS", 3, Kind::PhysicalAddress),
    (Sub::RegisteredAddress, "REGISTERED_ADDRESS", 4, Kind::PhysicalAddress),
    (Sub::HomePhone, "HOME_PHONE", 10, Kind::Telephone),
    (Sub::WorkPhone, "WORK_PHONE", 11, Kind::Telephone),
    (Sub::MobilePhone, "MOBILE_PHONE", 12, Kind::Telephone),
    (Sub::Fax, "FAX", 13, Kind::Telephone),
    (Sub::PersonalEmail, "PERSONAL_EMAIL", 20, Kind::Electronic),
    (Sub::WorkEmail, "WORK_EMAIL", 21, Kind::Electronic),
    (Sub::Website, "WEBSITE", 22, Kind::Electronic),
    (Sub::SocialMedia, "SOCIAL_MEDIA", 23, Kind::Electronic),
];

impl ContactMechanismSubType {
    fn row(&self) -> &'static (Sub, &'static str, u16, Kind) {
        // The table lists every variant in declaration order.
        &SUB_TYPES[*self as usize]
    }

    /// Every sub-type, in table order
    pub fn all() -> impl Iterator<Item = ContactMechanismSubType> {
        SUB_TYPES.iter().map(|(sub, ..)| *sub)
    }

    /// Looks up a sub-type by its legacy numeric code
    pub fn from_numeric_code(code: u16) -> Option<Self> {
        SUB_TYPES.iter().find(|(_, _, n, _)| *n == code).map(|(sub, ..)| *sub)
    }

    /// The legacy numeric code
    pub fn to_numeric_code(&self) -> u16 {
        self.row().2
    }

    /// Looks up a sub-type by its string code
    pub fn from_code(code: &str) -> Option<Self> {
        SUB_TYPES.iter().find(|(_, c, _, _)| *c == code).map(|(sub, ..)| *sub)
    }

    /// The string code
    pub fn code(&self) -> &'static str {
        self.row().1
    }

    /// The family this sub-type belongs to
    pub fn contact_mechanism_type(&self) -> ContactMechanismType {
        self.row().3
    }
}

impl fmt::Display for ContactMechanismSubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A postal address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAddress {
    #[validate(length(min = 1, max = 255))]
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line3: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[validate(length(max = 20))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    /// ISO 3166-1 alpha-2
    #[validate(length(equal = 2))]
    pub country: String,
    /// Code of a `PhysicalAddressType` row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_type: Option<String>,
    /// Code of a `PhysicalAddressRole` row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_role: Option<String>,
}

impl PhysicalAddress {
    pub fn new(line1: impl Into<String>, city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            line1: line1.into(),
            line2: None,
            line3: None,
            city: city.into(),
            region: None,
            postal_code: None,
            country: country.into(),
            address_type: None,
            address_role: None,
        }
    }

    /// Formats the address for display, one line per component
    pub fn format(&self) -> String {
        let mut lines = vec![self.line1.clone()];
        lines.extend(self.line2.iter().cloned());
        lines.extend(self.line3.iter().cloned());
        let city_line = match (&self.postal_code, &self.region) {
            (Some(postal), Some(region)) => format!("{} {}, {}", postal, self.city, region),
            (Some(postal), None) => format!("{} {}", postal, self.city),
            (None, Some(region)) => format!("{}, {}", self.city, region),
            (None, None) => self.city.clone(),
        };
        lines.push(city_line);
        lines.push(self.country.clone());
        lines.join("\n")
    }
}

/// A telephone number split into its dialling parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TelephoneNumber {
    #[validate(length(min = 1, max = 5))]
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_code: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl TelephoneNumber {
    /// Formats as `+<country> <area> <number> x<ext>`
    pub fn format(&self) -> String {
        let mut formatted = format!("+{}", self.country_code);
        if let Some(area) = &self.area_code {
            formatted.push(' ');
            formatted.push_str(area);
        }
        formatted.push(' ');
        formatted.push_str(&self.number);
        if let Some(extension) = &self.extension {
            formatted.push_str(" x");
            formatted.push_str(extension);
        }
        formatted
    }
}

/// The payload of a contact mechanism
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactMechanismValue {
    PhysicalAddress(PhysicalAddress),
    Telephone(TelephoneNumber),
    Electronic { address: String },
}

impl ContactMechanismValue {
    pub fn contact_mechanism_type(&self) -> ContactMechanismType {
        match self {
            ContactMechanismValue::PhysicalAddress(_) => ContactMechanismType::PhysicalAddress,
            ContactMechanismValue::Telephone(_) => ContactMechanismType::Telephone,
            ContactMechanismValue::Electronic { .. } => ContactMechanismType::Electronic,
        }
    }

    pub fn display(&self) -> String {
        match self {
            ContactMechanismValue::PhysicalAddress(address) => address.format(),
            ContactMechanismValue::Telephone(number) => number.format(),
            ContactMechanismValue::Electronic { address } => address.clone(),
        }
    }
}

/// A way to reach a party
///
/// A party may hold several mechanisms of the same sub-type (two mobile
/// numbers, say); `sequence` tells them apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMechanism {
    #[serde(default)]
    pub party_id: PartyId,
    pub sub_type: ContactMechanismSubType,
    #[serde(default)]
    pub sequence: u32,
    pub value: ContactMechanismValue,
    #[serde(default)]
    pub preferred: bool,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl ContactMechanism {
    pub fn new(party_id: PartyId, sub_type: ContactMechanismSubType, value: ContactMechanismValue) -> Self {
        Self {
            party_id,
            sub_type,
            sequence: 0,
            value,
            preferred: false,
            period: EffectivePeriod::open(),
        }
    }

    pub fn email(party_id: PartyId, sub_type: ContactMechanismSubType, address: impl Into<String>) -> Self {
        Self::new(party_id, sub_type, ContactMechanismValue::Electronic { address: address.into() })
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn preferred(mut self) -> Self {
        self.preferred = true;
        self
    }

    /// Returns true if the value is of the family the sub-type requires
    pub fn is_consistent(&self) -> bool {
        self.value.contact_mechanism_type() == self.sub_type.contact_mechanism_type()
    }
}

impl_party_child!(ContactMechanism {
    sub_type: ContactMechanismSubType,
    sequence: u32,
});
impl_time_bound!(ContactMechanism);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_numeric_code_round_trip() {
        for sub in ContactMechanismSubType::all() {
            assert_eq!(ContactMechanismSubType::from_numeric_code(sub.to_numeric_code()), Some(sub));
            assert_eq!(ContactMechanismSubType::from_code(sub.code()), Some(sub));
        }
        assert_eq!(ContactMechanismSubType::all().count(), 12);
    }

    #[test]
    fn test_table_matches_declaration_order() {
        for (index, sub) in ContactMechanismSubType::all().enumerate() {
            assert_eq!(sub as usize, index);
        }
    }

    #[test]
    fn test_codes_are_unique() {
        let numeric: HashSet<_> = ContactMechanismSubType::all().map(|s| s.to_numeric_code()).collect();
        let text: HashSet<_> = ContactMechanismSubType::all().map(|s| s.code()).collect();
        assert_eq!(numeric.len(), 12);
        assert_eq!(text.len(), 12);
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(ContactMechanismSubType::from_numeric_code(12), Some(ContactMechanismSubType::MobilePhone));
        assert_eq!(ContactMechanismSubType::WorkEmail.to_numeric_code(), 21);
        assert_eq!(
            ContactMechanismSubType::RegisteredAddress.contact_mechanism_type(),
            ContactMechanismType::PhysicalAddress
        );
        assert_eq!(ContactMechanismSubType::from_numeric_code(99), None);
        assert_eq!(ContactMechanismSubType::from_code("mobile_phone"), None);
    }

    #[test]
    fn test_serde_code_matches_table_code() {
        for sub in ContactMechanismSubType::all() {
            let json = serde_json::to_string(&sub).unwrap();
            assert_eq!(json, format!("\"{}\"", sub.code()));
        }
    }

    #[test]
    fn test_equality_by_sub_type_and_sequence() {
        let party = PartyId::new();
        let first = ContactMechanism::email(party, ContactMechanismSubType::WorkEmail, "a@example.com");
        let changed = ContactMechanism::email(party, ContactMechanismSubType::WorkEmail, "b@example.com");
        let second = changed.clone().with_sequence(1);
        assert_eq!(first, changed);
        assert_ne!(first, second);
    }

    #[test]
    fn test_consistency() {
        let party = PartyId::new();
        let ok = ContactMechanism::email(party, ContactMechanismSubType::PersonalEmail, "x@example.com");
        let wrong = ContactMechanism::email(party, ContactMechanismSubType::MobilePhone, "x@example.com");
        assert!(ok.is_consistent());
        assert!(!wrong.is_consistent());
    }

    #[test]
    fn test_address_validation_and_format() {
        let mut address = PhysicalAddress::new("1 Main Street", "Brussels", "BE");
        address.postal_code = Some("1000".to_string());
        assert!(address.validate().is_ok());
        assert_eq!(address.format(), "1 Main Street\n1000 Brussels\nBE");

        address.country = "BEL".to_string();
        assert!(address.validate().is_err());
    }

    #[test]
    fn test_telephone_format() {
        let number = TelephoneNumber {
            country_code: "32".into(),
            area_code: Some("2".into()),
            number: "5551234".into(),
            extension: None,
        };
        assert_eq!(number.format(), "+32 2 5551234");
    }
}
