//! Identity documents, tax numbers and external references

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{EffectivePeriod, PartyId};

use crate::child::{impl_party_child, impl_time_bound};

/// A passport, identity card or similar document held by a party
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDocument {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of an `IdentityDocumentType` row
    pub document_type: String,
    #[validate(length(min = 1, max = 50))]
    pub document_number: String,
    #[validate(length(equal = 2))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuing_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuing_authority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
}

impl IdentityDocument {
    pub fn new(party_id: PartyId, document_type: impl Into<String>, document_number: impl Into<String>) -> Self {
        Self {
            party_id,
            document_type: document_type.into(),
            document_number: document_number.into(),
            issuing_country: None,
            issuing_authority: None,
            issue_date: None,
            expiry_date: None,
        }
    }

    /// Returns true if the document has expired by `date`
    pub fn is_expired_on(&self, date: NaiveDate) -> bool {
        self.expiry_date.map_or(false, |expiry| expiry < date)
    }
}

impl_party_child!(IdentityDocument {
    document_type: String,
    document_number: String,
});

/// A tax identification number, one per type and country
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaxNumber {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of a `TaxNumberType` row
    pub tax_number_type: String,
    #[validate(length(equal = 2))]
    pub country: String,
    #[validate(length(min = 1, max = 50))]
    pub tax_number: String,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl TaxNumber {
    pub fn new(
        party_id: PartyId,
        tax_number_type: impl Into<String>,
        country: impl Into<String>,
        tax_number: impl Into<String>,
    ) -> Self {
        Self {
            party_id,
            tax_number_type: tax_number_type.into(),
            country: country.into(),
            tax_number: tax_number.into(),
            period: EffectivePeriod::open(),
        }
    }
}

impl_party_child!(TaxNumber {
    tax_number_type: String,
    country: String,
});
impl_time_bound!(TaxNumber);

/// The identifier a party has in another system
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExternalReference {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of an `ExternalReferenceType` row
    pub reference_type: String,
    #[validate(length(min = 1, max = 255))]
    pub value: String,
}

impl ExternalReference {
    pub fn new(party_id: PartyId, reference_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            party_id,
            reference_type: reference_type.into(),
            value: value.into(),
        }
    }
}

impl_party_child!(ExternalReference { reference_type: String });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_document_key_includes_number() {
        let party = PartyId::new();
        let first = IdentityDocument::new(party, "PASSPORT", "P1");
        let mut same = IdentityDocument::new(party, "PASSPORT", "P1");
        same.issuing_country = Some("FR".into());
        let other = IdentityDocument::new(party, "PASSPORT", "P2");

        assert_eq!(first, same);
        assert_ne!(first, other);
    }

    #[test]
    fn test_tax_number_key_is_type_and_country() {
        let party = PartyId::new();
        let be = TaxNumber::new(party, "VAT", "BE", "BE0123456789");
        let be_changed = TaxNumber::new(party, "VAT", "BE", "BE0999999999");
        let nl = TaxNumber::new(party, "VAT", "NL", "NL123456789B01");
        assert_eq!(be, be_changed);
        assert_ne!(be, nl);
    }

    #[test]
    fn test_document_expiry() {
        let mut document = IdentityDocument::new(PartyId::new(), "ID_CARD", "123");
        let day = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(!document.is_expired_on(day));
        document.expiry_date = NaiveDate::from_ymd_opt(2029, 12, 31);
        assert!(document.is_expired_on(day));
    }
}
