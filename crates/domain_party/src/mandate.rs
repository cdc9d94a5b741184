//! Mandates
//!
//! A mandate authorizes other parties (the mandataries) to act for the
//! mandating party within a period. Its properties are free-form values
//! whose format is governed by the `MandatePropertyType` catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{AuditStamps, EffectivePeriod, MandateId, PartyId, TenantId};

use crate::child::{impl_key_identity, impl_time_bound, ChildEntity, ChildSet, TimeBound};
use crate::reference::{MandatePropertyType, ReferenceData};

/// A party acting under a mandate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mandatary {
    #[serde(default)]
    pub mandate_id: MandateId,
    pub party_id: PartyId,
    /// Code of a `MandataryType` row
    pub mandatary_type: String,
    /// Code of a `MandataryRole` row
    pub mandatary_role: String,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl Mandatary {
    pub fn new(
        mandate_id: MandateId,
        party_id: PartyId,
        mandatary_type: impl Into<String>,
        mandatary_role: impl Into<String>,
    ) -> Self {
        Self {
            mandate_id,
            party_id,
            mandatary_type: mandatary_type.into(),
            mandatary_role: mandatary_role.into(),
            period: EffectivePeriod::open(),
        }
    }
}

impl ChildEntity for Mandatary {
    type Key = (MandateId, PartyId, String);
    type Owner = MandateId;

    fn key(&self) -> Self::Key {
        (self.mandate_id, self.party_id, self.mandatary_role.clone())
    }

    fn owner(&self) -> MandateId {
        self.mandate_id
    }

    fn set_owner(&mut self, owner: MandateId) {
        self.mandate_id = owner;
    }
}

/// A typed value attached to a mandate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MandateProperty {
    #[serde(default)]
    pub mandate_id: MandateId,
    /// Code of a `MandatePropertyType` row
    pub property_type: String,
    pub value: String,
}

impl MandateProperty {
    pub fn new(mandate_id: MandateId, property_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            mandate_id,
            property_type: property_type.into(),
            value: value.into(),
        }
    }
}

impl ChildEntity for MandateProperty {
    type Key = (MandateId, String);
    type Owner = MandateId;

    fn key(&self) -> Self::Key {
        (self.mandate_id, self.property_type.clone())
    }

    fn owner(&self) -> MandateId {
        self.mandate_id
    }

    fn set_owner(&mut self, owner: MandateId) {
        self.mandate_id = owner;
    }
}

impl_key_identity!(Mandatary, MandateProperty);
impl_time_bound!(Mandatary);

/// A problem with a mandate's properties
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyViolation {
    #[error("unknown mandate property type '{0}'")]
    UnknownType(String),

    #[error("value '{value}' does not match the format of property '{property_type}'")]
    InvalidValue { property_type: String, value: String },

    #[error("required mandate property '{0}' is missing")]
    MissingRequired(String),

    #[error("property type '{property_type}' has an invalid pattern: {message}")]
    InvalidPattern { property_type: String, message: String },
}

/// An authorization for mandataries to act for a party
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mandate {
    pub id: MandateId,
    pub tenant_id: TenantId,
    /// The mandating party
    pub party_id: PartyId,
    pub mandate_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub period: EffectivePeriod,
    #[serde(default)]
    pub mandataries: ChildSet<Mandatary>,
    #[serde(default)]
    pub properties: ChildSet<MandateProperty>,
    #[serde(default)]
    pub audit: AuditStamps,
}

impl Mandate {
    pub fn new(tenant_id: TenantId, party_id: PartyId, mandate_type: impl Into<String>) -> Self {
        Self {
            id: MandateId::new_v7(),
            tenant_id,
            party_id,
            mandate_type: mandate_type.into(),
            description: None,
            period: EffectivePeriod::open(),
            mandataries: ChildSet::new(),
            properties: ChildSet::new(),
            audit: AuditStamps::default(),
        }
    }

    /// Adds a mandatary, replacing one with the same party and role
    pub fn add_mandatary(
        &mut self,
        party_id: PartyId,
        mandatary_type: impl Into<String>,
        mandatary_role: impl Into<String>,
    ) {
        self.mandataries
            .upsert(Mandatary::new(self.id, party_id, mandatary_type, mandatary_role));
    }

    /// Sets a property value
    pub fn set_property(&mut self, property_type: impl Into<String>, value: impl Into<String>) {
        self.properties.upsert(MandateProperty::new(self.id, property_type, value));
    }

    pub fn property(&self, property_type: &str) -> Option<&str> {
        self.properties.get(&(self.id, property_type.to_string())).map(|p| p.value.as_str())
    }

    /// Points mandataries and properties at this mandate
    pub fn claim_children(&mut self) {
        self.mandataries.claim(self.id);
        self.properties.claim(self.id);
    }

    /// Returns true if `party_id` may act under this mandate on `date`
    pub fn is_mandatary(&self, party_id: PartyId, date: NaiveDate) -> bool {
        self.period.contains(date)
            && self
                .mandataries
                .iter()
                .any(|m| m.party_id == party_id && m.is_effective_on(date))
    }

    /// Checks property values against the property-type catalog
    ///
    /// An empty catalog is not enforced. Otherwise every property must name
    /// a known type, every value must fully match its type's pattern, and
    /// every required type must be present.
    pub fn validate_properties(&self, types: &[MandatePropertyType]) -> Vec<PropertyViolation> {
        let mut violations = Vec::new();
        if types.is_empty() {
            return violations;
        }

        for property in self.properties.iter() {
            let Some(property_type) = types.iter().find(|t| t.code() == property.property_type) else {
                violations.push(PropertyViolation::UnknownType(property.property_type.clone()));
                continue;
            };
            match property_type.accepts(&property.value) {
                Ok(true) => {}
                Ok(false) => violations.push(PropertyViolation::InvalidValue {
                    property_type: property.property_type.clone(),
                    value: property.value.clone(),
                }),
                Err(e) => violations.push(PropertyViolation::InvalidPattern {
                    property_type: property.property_type.clone(),
                    message: e.to_string(),
                }),
            }
        }

        for required in types.iter().filter(|t| t.required) {
            if self.property(required.code()).is_none() {
                violations.push(PropertyViolation::MissingRequired(required.code().to_string()));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::CatalogEntry;

    fn property_type(code: &str, pattern: Option<&str>) -> MandatePropertyType {
        MandatePropertyType::new(
            CatalogEntry::new(TenantId::new(), "en".parse().unwrap(), code, ""),
            pattern.map(str::to_string),
        )
    }

    fn mandate() -> Mandate {
        Mandate::new(TenantId::new(), PartyId::new(), "BANK_ACCOUNT")
    }

    #[test]
    fn test_validate_properties() {
        let types = vec![
            property_type("LIMIT", Some(r"\d+")),
            property_type("ACCOUNT", None).required(),
        ];
        let mut mandate = mandate();
        mandate.set_property("LIMIT", "12a");
        mandate.set_property("COLOUR", "blue");

        let violations = mandate.validate_properties(&types);
        assert!(violations.contains(&PropertyViolation::InvalidValue {
            property_type: "LIMIT".into(),
            value: "12a".into(),
        }));
        assert!(violations.contains(&PropertyViolation::UnknownType("COLOUR".into())));
        assert!(violations.contains(&PropertyViolation::MissingRequired("ACCOUNT".into())));
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn test_valid_properties() {
        let types = vec![property_type("LIMIT", Some(r"\d+"))];
        let mut mandate = mandate();
        mandate.set_property("LIMIT", "5000");
        assert!(mandate.validate_properties(&types).is_empty());
        assert!(mandate.validate_properties(&[]).is_empty());
    }

    #[test]
    fn test_is_mandatary() {
        let mut mandate = mandate();
        let attorney = PartyId::new();
        mandate.add_mandatary(attorney, "PERSON", "ATTORNEY");
        let today = chrono::Utc::now().date_naive();

        assert!(mandate.is_mandatary(attorney, today));
        assert!(!mandate.is_mandatary(PartyId::new(), today));
    }

    #[test]
    fn test_property_identity() {
        let id = MandateId::new();
        assert_eq!(MandateProperty::new(id, "LIMIT", "1"), MandateProperty::new(id, "LIMIT", "2"));
    }

    #[test]
    fn test_claim_children() {
        let mut mandate = mandate();
        mandate.properties.upsert(MandateProperty::new(MandateId::new(), "LIMIT", "1"));
        mandate.claim_children();
        assert_eq!(mandate.property("LIMIT"), Some("1"));
    }
}
