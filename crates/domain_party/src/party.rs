//! Party aggregate
//!
//! A party is either a person or an organization. Both share the same root
//! record (identity, tenant, audit stamps) and the same families of child
//! facts; the type-specific details live in `PartyDetails`.
//!
//! # Examples
//!
//! ```rust
//! use domain_party::party::{Party, Person, PartyType};
//! use core_kernel::TenantId;
//!
//! let party = Party::new_person(TenantId::new(), Person::new("Ada", "Lovelace"));
//!
//! assert_eq!(party.party_type(), PartyType::Person);
//! assert_eq!(party.display_name(), "Ada Lovelace");
//! ```

use std::fmt;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{AuditStamps, PartyId, TenantId};

use crate::attribute::Attribute;
use crate::child::ChildSet;
use crate::consent::{Consent, Preference};
use crate::contact_mechanism::{ContactMechanism, ContactMechanismType};
use crate::document::{ExternalReference, IdentityDocument, TaxNumber};
use crate::funds::{SourceOfFunds, SourceOfWealth};
use crate::profile::{IndustryClassification, LanguageProficiency, Skill};
use crate::status::{Lock, PartyRole, PartySegment, Status};

/// The two kinds of party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyType {
    Person,
    Organization,
}

impl PartyType {
    /// The code stored in party-type filters and the `party_type` column
    pub fn code(&self) -> &'static str {
        match self {
            PartyType::Person => "PERSON",
            PartyType::Organization => "ORGANIZATION",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PERSON" => Some(PartyType::Person),
            "ORGANIZATION" => Some(PartyType::Organization),
            _ => None,
        }
    }

    pub fn all() -> &'static [PartyType] {
        &[PartyType::Person, PartyType::Organization]
    }
}

impl fmt::Display for PartyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Natural person details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[validate(length(max = 50))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Legal first name
    #[validate(length(min = 1, max = 100))]
    pub given_name: String,
    #[validate(length(max = 200))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_names: Option<String>,
    /// Legal last name / surname
    #[validate(length(min = 1, max = 100))]
    pub family_name: String,
    /// Name the person wants to be addressed by
    #[validate(length(max = 100))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_death: Option<NaiveDate>,
    /// Code of a `Gender` row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// Country of nationality (ISO 3166-1 alpha-2)
    #[validate(length(equal = 2))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[validate(length(equal = 2))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_of_residence: Option<String>,
    /// Code of a `ResidencyStatus` row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residency_status: Option<String>,
    /// Code of a `ResidentialType` row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residential_type: Option<String>,
}

impl Person {
    pub fn new(given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        Self {
            title: None,
            given_name: given_name.into(),
            middle_names: None,
            family_name: family_name.into(),
            preferred_name: None,
            date_of_birth: None,
            date_of_death: None,
            gender: None,
            nationality: None,
            country_of_residence: None,
            residency_status: None,
            residential_type: None,
        }
    }

    /// Returns the full name of the person
    ///
    /// # Returns
    ///
    /// Full name in "Given Middle Family" format
    pub fn full_name(&self) -> String {
        match &self.middle_names {
            Some(middle) => format!("{} {} {}", self.given_name, middle, self.family_name),
            None => format!("{} {}", self.given_name, self.family_name),
        }
    }

    /// Returns the age in whole years on `date`, if the birth date is known
    pub fn age_on(&self, date: NaiveDate) -> Option<u32> {
        self.date_of_birth.and_then(|birth| date.years_since(birth))
    }

    pub fn is_deceased(&self) -> bool {
        self.date_of_death.is_some()
    }
}

/// Legal entity details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Trading name
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 200))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[validate(length(max = 50))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incorporation_date: Option<NaiveDate>,
    #[validate(length(equal = 2))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incorporation_country: Option<String>,
    #[validate(length(max = 255))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            legal_name: None,
            registration_number: None,
            incorporation_date: None,
            incorporation_country: None,
            website: None,
        }
    }
}

/// Type-specific party details, tagged with the party type on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "partyType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyDetails {
    Person(Person),
    Organization(Organization),
}

impl PartyDetails {
    pub fn party_type(&self) -> PartyType {
        match self {
            PartyDetails::Person(_) => PartyType::Person,
            PartyDetails::Organization(_) => PartyType::Organization,
        }
    }
}

/// The party aggregate root
///
/// Child collections are keyed by their composite keys; every child's
/// `party_id` must equal the aggregate's `id`, which `claim_children`
/// enforces before the aggregate is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    pub id: PartyId,
    pub tenant_id: TenantId,
    pub details: PartyDetails,
    #[serde(default)]
    pub attributes: ChildSet<Attribute>,
    #[serde(default)]
    pub contact_mechanisms: ChildSet<ContactMechanism>,
    #[serde(default)]
    pub identity_documents: ChildSet<IdentityDocument>,
    #[serde(default)]
    pub tax_numbers: ChildSet<TaxNumber>,
    #[serde(default)]
    pub external_references: ChildSet<ExternalReference>,
    #[serde(default)]
    pub locks: ChildSet<Lock>,
    #[serde(default)]
    pub roles: ChildSet<PartyRole>,
    #[serde(default)]
    pub statuses: ChildSet<Status>,
    #[serde(default)]
    pub segments: ChildSet<PartySegment>,
    #[serde(default)]
    pub skills: ChildSet<Skill>,
    #[serde(default)]
    pub language_proficiencies: ChildSet<LanguageProficiency>,
    #[serde(default)]
    pub industry_classifications: ChildSet<IndustryClassification>,
    #[serde(default)]
    pub sources_of_funds: ChildSet<SourceOfFunds>,
    #[serde(default)]
    pub sources_of_wealth: ChildSet<SourceOfWealth>,
    #[serde(default)]
    pub consents: ChildSet<Consent>,
    #[serde(default)]
    pub preferences: ChildSet<Preference>,
    #[serde(default)]
    pub audit: AuditStamps,
}

impl Party {
    fn with_details(tenant_id: TenantId, details: PartyDetails) -> Self {
        Self {
            id: PartyId::new_v7(),
            tenant_id,
            details,
            attributes: ChildSet::new(),
            contact_mechanisms: ChildSet::new(),
            identity_documents: ChildSet::new(),
            tax_numbers: ChildSet::new(),
            external_references: ChildSet::new(),
            locks: ChildSet::new(),
            roles: ChildSet::new(),
            statuses: ChildSet::new(),
            segments: ChildSet::new(),
            skills: ChildSet::new(),
            language_proficiencies: ChildSet::new(),
            industry_classifications: ChildSet::new(),
            sources_of_funds: ChildSet::new(),
            sources_of_wealth: ChildSet::new(),
            consents: ChildSet::new(),
            preferences: ChildSet::new(),
            audit: AuditStamps::default(),
        }
    }

    /// Creates a new person party
    pub fn new_person(tenant_id: TenantId, person: Person) -> Self {
        Self::with_details(tenant_id, PartyDetails::Person(person))
    }

    /// Creates a new organization party
    pub fn new_organization(tenant_id: TenantId, organization: Organization) -> Self {
        Self::with_details(tenant_id, PartyDetails::Organization(organization))
    }

    pub fn party_type(&self) -> PartyType {
        self.details.party_type()
    }

    /// Returns the name to show for the party
    ///
    /// Persons use their preferred name when set, otherwise their full
    /// name. Organizations use their trading name.
    pub fn display_name(&self) -> String {
        match &self.details {
            PartyDetails::Person(person) => match &person.preferred_name {
                Some(preferred) => format!("{} {}", preferred, person.family_name),
                None => person.full_name(),
            },
            PartyDetails::Organization(organization) => organization.name.clone(),
        }
    }

    pub fn person(&self) -> Option<&Person> {
        match &self.details {
            PartyDetails::Person(person) => Some(person),
            PartyDetails::Organization(_) => None,
        }
    }

    pub fn organization(&self) -> Option<&Organization> {
        match &self.details {
            PartyDetails::Organization(organization) => Some(organization),
            PartyDetails::Person(_) => None,
        }
    }

    /// Returns the root record without child facts
    pub fn summary(&self) -> PartySummary {
        PartySummary {
            id: self.id,
            tenant_id: self.tenant_id,
            party_type: self.party_type(),
            display_name: self.display_name(),
            audit: self.audit.clone(),
        }
    }

    /// Points every child record at this party
    pub fn claim_children(&mut self) {
        let id = self.id;
        self.attributes.claim(id);
        self.contact_mechanisms.claim(id);
        self.identity_documents.claim(id);
        self.tax_numbers.claim(id);
        self.external_references.claim(id);
        self.locks.claim(id);
        self.roles.claim(id);
        self.statuses.claim(id);
        self.segments.claim(id);
        self.skills.claim(id);
        self.language_proficiencies.claim(id);
        self.industry_classifications.claim(id);
        self.sources_of_funds.claim(id);
        self.sources_of_wealth.claim(id);
        self.consents.claim(id);
        self.preferences.claim(id);
    }

    /// Returns true if any lock is effective on `date`
    pub fn is_locked_on(&self, date: NaiveDate) -> bool {
        self.locks.effective_on(date).next().is_some()
    }

    pub fn is_locked(&self) -> bool {
        self.is_locked_on(Utc::now().date_naive())
    }

    /// Returns the status codes effective on `date`
    pub fn statuses_on(&self, date: NaiveDate) -> Vec<&str> {
        self.statuses
            .effective_on(date)
            .map(|status| status.status_type.as_str())
            .collect()
    }

    /// Returns the preferred mechanism of a family, or the first one if
    /// none is flagged preferred
    pub fn preferred_contact(&self, kind: ContactMechanismType) -> Option<&ContactMechanism> {
        let mut of_kind = self
            .contact_mechanisms
            .iter()
            .filter(|mechanism| mechanism.sub_type.contact_mechanism_type() == kind);
        let first = of_kind.next()?;
        if first.preferred {
            return Some(first);
        }
        of_kind.find(|mechanism| mechanism.preferred).or(Some(first))
    }

    /// Returns the party's identifier in another system
    pub fn external_reference(&self, reference_type: &str) -> Option<&str> {
        self.external_references
            .iter()
            .find(|reference| reference.reference_type == reference_type)
            .map(|reference| reference.value.as_str())
    }

    /// Returns true if the party is in `segment` today
    pub fn in_segment(&self, segment: &str) -> bool {
        let today = Utc::now().date_naive();
        self.segments
            .effective_on(today)
            .any(|membership| membership.segment == segment)
    }
}

/// The root record of a party without child facts, used in list results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySummary {
    pub id: PartyId,
    pub tenant_id: TenantId,
    pub party_type: PartyType,
    pub display_name: String,
    pub audit: AuditStamps,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::child::ChildEntity;
    use crate::contact_mechanism::ContactMechanismSubType;
    use crate::status::Lock;
    use core_kernel::EffectivePeriod;

    #[test]
    fn test_party_type_codes() {
        for party_type in PartyType::all() {
            assert_eq!(PartyType::from_code(party_type.code()), Some(*party_type));
        }
        assert_eq!(PartyType::from_code("person"), None);
    }

    #[test]
    fn test_details_wire_tag() {
        let party = Party::new_organization(TenantId::new(), Organization::new("Acme"));
        let json = serde_json::to_value(&party).unwrap();
        assert_eq!(json["details"]["partyType"], "ORGANIZATION");
        assert_eq!(json["details"]["name"], "Acme");
    }

    #[test]
    fn test_display_name_prefers_preferred_name() {
        let mut person = Person::new("Margaret", "Hamilton");
        let tenant = TenantId::new();
        assert_eq!(Party::new_person(tenant, person.clone()).display_name(), "Margaret Hamilton");
        person.preferred_name = Some("Maggie".into());
        assert_eq!(Party::new_person(tenant, person).display_name(), "Maggie Hamilton");
    }

    #[test]
    fn test_claim_children_reparents() {
        let mut party = Party::new_person(TenantId::new(), Person::new("A", "B"));
        party.locks.upsert(Lock::new(PartyId::new(), "FRAUD", EffectivePeriod::open()));
        party.claim_children();
        assert!(party.locks.iter().all(|lock| lock.owner() == party.id));
        assert!(party.is_locked());
    }

    #[test]
    fn test_preferred_contact() {
        let mut party = Party::new_person(TenantId::new(), Person::new("A", "B"));
        let id = party.id;
        party.contact_mechanisms.upsert(ContactMechanism::email(id, ContactMechanismSubType::WorkEmail, "w@x.io"));
        party
            .contact_mechanisms
            .upsert(ContactMechanism::email(id, ContactMechanismSubType::PersonalEmail, "p@x.io").preferred());

        let preferred = party.preferred_contact(ContactMechanismType::Electronic).unwrap();
        assert_eq!(preferred.value.display(), "p@x.io");
        assert!(party.preferred_contact(ContactMechanismType::Telephone).is_none());
    }

    #[test]
    fn test_json_round_trip_keeps_children() {
        let mut party = Party::new_person(TenantId::new(), Person::new("A", "B"));
        party.locks.upsert(Lock::new(party.id, "FRAUD", EffectivePeriod::open()));
        let json = serde_json::to_string(&party).unwrap();
        let restored: Party = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, party.id);
        assert_eq!(restored.locks.len(), 1);
        assert_eq!(restored.details, party.details);
    }

    #[test]
    fn test_age_on() {
        let mut person = Person::new("A", "B");
        person.date_of_birth = NaiveDate::from_ymd_opt(1990, 6, 15);
        assert_eq!(person.age_on(NaiveDate::from_ymd_opt(2020, 6, 14).unwrap()), Some(29));
        assert_eq!(person.age_on(NaiveDate::from_ymd_opt(2020, 6, 15).unwrap()), Some(30));
    }
}
