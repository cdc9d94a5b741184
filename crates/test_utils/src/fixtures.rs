//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for parties, catalogs and request contexts. The
//! fixtures are deterministic apart from generated IDs.

use std::sync::Arc;

use chrono::NaiveDate;
use unic_langid::LanguageIdentifier;

use core_kernel::{EffectivePeriod, TenantId};
use domain_party::reference::{
    CatalogEntry, PartyTypeFilter, ReferenceItem, Segment, TaxNumberType,
};
use domain_party::{
    ContactMechanism, ContactMechanismSubType, InMemoryPartyStore, Organization, Party,
    PartyService, PartyType, Person, RequestContext,
};

/// Fixture for dates and periods
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    pub fn birth_date() -> NaiveDate {
        Self::date(1985, 6, 15)
    }

    /// The year 2024, inclusive at both ends
    pub fn year_2024() -> EffectivePeriod {
        EffectivePeriod::between(Self::date(2024, 1, 1), Self::date(2024, 12, 31)).unwrap()
    }
}

/// Fixture for tenants and request contexts
pub struct ContextFixtures;

impl ContextFixtures {
    pub fn context(tenant_id: TenantId) -> RequestContext {
        RequestContext::new(tenant_id)
            .with_actor("test-user")
            .with_correlation_id("test-correlation")
    }

    /// A context for a brand new tenant
    pub fn fresh() -> RequestContext {
        Self::context(TenantId::new())
    }

    pub fn english() -> LanguageIdentifier {
        "en".parse().unwrap()
    }

    pub fn german() -> LanguageIdentifier {
        "de".parse().unwrap()
    }
}

/// Fixture for party aggregates
pub struct PartyFixtures;

impl PartyFixtures {
    pub fn person(tenant_id: TenantId) -> Party {
        let mut person = Person::new("Ada", "Lovelace");
        person.date_of_birth = Some(TemporalFixtures::birth_date());
        person.nationality = Some("GB".to_string());
        Party::new_person(tenant_id, person)
    }

    pub fn organization(tenant_id: TenantId) -> Party {
        let mut organization = Organization::new("Acme");
        organization.legal_name = Some("Acme Holdings Ltd".to_string());
        organization.incorporation_country = Some("CH".to_string());
        Party::new_organization(tenant_id, organization)
    }

    /// A person with an email address
    pub fn person_with_email(tenant_id: TenantId) -> Party {
        let mut party = Self::person(tenant_id);
        party.contact_mechanisms.upsert(ContactMechanism::email(
            party.id,
            ContactMechanismSubType::PersonalEmail,
            "ada@example.com",
        ));
        party
    }
}

/// Fixture for catalog rows
pub struct CatalogFixtures;

impl CatalogFixtures {
    pub fn entry(tenant_id: TenantId, code: &str) -> CatalogEntry {
        CatalogEntry::new(tenant_id, ContextFixtures::english(), code, format!("{} description", code))
    }

    /// A segment restricted to the given party types
    pub fn segment(tenant_id: TenantId, code: &str, party_types: &[PartyType]) -> ReferenceItem {
        Segment::new(Self::entry(tenant_id, code), PartyTypeFilter::for_party_types(party_types)).into()
    }

    /// The Swiss UID format, valid for organizations
    pub fn swiss_uid(tenant_id: TenantId) -> ReferenceItem {
        TaxNumberType::new(
            Self::entry(tenant_id, "CH_UID"),
            PartyTypeFilter::for_party_types(&[PartyType::Organization]),
        )
        .with_country("CH")
        .with_pattern(r"CHE-\d{3}\.\d{3}\.\d{3}")
        .into()
    }
}

/// A service over a fresh in-memory store, with the store for direct access
pub fn in_memory_service() -> (PartyService, Arc<InMemoryPartyStore>) {
    let store = Arc::new(InMemoryPartyStore::new());
    (PartyService::new(store.clone(), store.clone()), store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_party::reference::ReferenceData;

    #[test]
    fn test_fixture_parties_have_expected_types() {
        let tenant = TenantId::new();
        assert_eq!(PartyFixtures::person(tenant).party_type(), PartyType::Person);
        assert_eq!(PartyFixtures::organization(tenant).party_type(), PartyType::Organization);
    }

    #[test]
    fn test_email_is_owned_by_the_person() {
        let party = PartyFixtures::person_with_email(TenantId::new());
        assert!(party.contact_mechanisms.iter().all(|c| c.party_id == party.id));
    }

    #[test]
    fn test_catalog_fixtures_are_scoped_to_tenant() {
        let tenant = TenantId::new();
        let item = CatalogFixtures::swiss_uid(tenant);
        assert_eq!(item.tenant_id(), tenant);
        assert_eq!(item.code(), "CH_UID");
        assert!(item.validate_fields().is_ok());
    }
}
