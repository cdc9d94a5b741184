//! Test Data Builders
//!
//! Builders for parties and mandates with sensible defaults, so tests only
//! spell out the facts they care about.

use core_kernel::{EffectivePeriod, PartyId, TenantId};
use domain_party::{
    ContactMechanism, ContactMechanismSubType, ExternalReference, IdentityDocument, Mandatary,
    Mandate, MandateProperty, Organization, Party, PartyDetails, PartyRole, PartySegment, Person, Status,
    TaxNumber,
};

/// Builder for party aggregates
pub struct PartyBuilder {
    party: Party,
}

impl PartyBuilder {
    /// Starts a person named Ada Lovelace
    pub fn person(tenant_id: TenantId) -> Self {
        Self {
            party: Party::new_person(tenant_id, Person::new("Ada", "Lovelace")),
        }
    }

    /// Starts an organization named Acme
    pub fn organization(tenant_id: TenantId) -> Self {
        Self {
            party: Party::new_organization(tenant_id, Organization::new("Acme")),
        }
    }

    pub fn with_id(mut self, id: PartyId) -> Self {
        self.party.id = id;
        self.party.claim_children();
        self
    }

    /// Renames the party: given and family name for persons, trading name
    /// for organizations
    pub fn named(mut self, name: &str) -> Self {
        match &mut self.party.details {
            PartyDetails::Person(person) => {
                let (given, family) = name.split_once(' ').unwrap_or((name, name));
                person.given_name = given.to_string();
                person.family_name = family.to_string();
            }
            PartyDetails::Organization(organization) => {
                organization.name = name.to_string();
            }
        }
        self
    }

    pub fn with_email(mut self, address: &str) -> Self {
        let sequence = self.party.contact_mechanisms.len() as u32;
        self.party.contact_mechanisms.upsert(
            ContactMechanism::email(self.party.id, ContactMechanismSubType::WorkEmail, address)
                .with_sequence(sequence),
        );
        self
    }

    pub fn with_segment(mut self, segment: &str) -> Self {
        self.party.segments.upsert(PartySegment::new(self.party.id, segment));
        self
    }

    pub fn with_role(mut self, role_type: &str) -> Self {
        self.party.roles.upsert(PartyRole::new(self.party.id, role_type));
        self
    }

    pub fn with_status(mut self, status_type: &str, period: EffectivePeriod) -> Self {
        self.party.statuses.upsert(Status::new(self.party.id, status_type, period));
        self
    }

    pub fn with_external_reference(mut self, reference_type: &str, value: &str) -> Self {
        self.party
            .external_references
            .upsert(ExternalReference::new(self.party.id, reference_type, value));
        self
    }

    pub fn with_document(mut self, document_type: &str, number: &str) -> Self {
        self.party
            .identity_documents
            .upsert(IdentityDocument::new(self.party.id, document_type, number));
        self
    }

    pub fn with_tax_number(mut self, tax_number_type: &str, country: &str, number: &str) -> Self {
        self.party
            .tax_numbers
            .upsert(TaxNumber::new(self.party.id, tax_number_type, country, number));
        self
    }

    pub fn build(self) -> Party {
        self.party
    }
}

/// Builder for mandates
pub struct MandateBuilder {
    mandate: Mandate,
}

impl MandateBuilder {
    /// Starts a `SIGNING` mandate granted by `party_id`
    pub fn new(tenant_id: TenantId, party_id: PartyId) -> Self {
        Self {
            mandate: Mandate::new(tenant_id, party_id, "SIGNING"),
        }
    }

    pub fn of_type(mut self, mandate_type: &str) -> Self {
        self.mandate.mandate_type = mandate_type.to_string();
        self
    }

    pub fn with_period(mut self, period: EffectivePeriod) -> Self {
        self.mandate.period = period;
        self
    }

    pub fn with_mandatary(mut self, party_id: PartyId, role: &str) -> Self {
        self.mandate
            .mandataries
            .upsert(Mandatary::new(self.mandate.id, party_id, "PERSON", role));
        self
    }

    pub fn with_property(mut self, property_type: &str, value: &str) -> Self {
        self.mandate
            .properties
            .upsert(MandateProperty::new(self.mandate.id, property_type, value));
        self
    }

    pub fn build(self) -> Mandate {
        self.mandate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_party::PartyType;

    #[test]
    fn test_children_follow_a_new_id() {
        let id = PartyId::new();
        let party = PartyBuilder::organization(TenantId::new())
            .with_segment("RETAIL")
            .with_role("CUSTOMER")
            .with_id(id)
            .build();

        assert_eq!(party.id, id);
        assert!(party.segments.iter().all(|s| s.party_id == id));
        assert!(party.roles.iter().all(|r| r.party_id == id));
    }

    #[test]
    fn test_emails_get_distinct_sequences() {
        let party = PartyBuilder::person(TenantId::new())
            .with_email("a@example.com")
            .with_email("b@example.com")
            .build();
        assert_eq!(party.contact_mechanisms.len(), 2);
    }

    #[test]
    fn test_named_person() {
        let party = PartyBuilder::person(TenantId::new()).named("Grace Hopper").build();
        assert_eq!(party.party_type(), PartyType::Person);
        assert_eq!(party.display_name(), "Grace Hopper");
    }

    #[test]
    fn test_mandate_builder() {
        let tenant = TenantId::new();
        let mandate = MandateBuilder::new(tenant, PartyId::new())
            .with_mandatary(PartyId::new(), "SIGNATORY")
            .with_property("LIMIT", "1000")
            .build();
        assert_eq!(mandate.mandataries.len(), 1);
        assert!(mandate.properties.iter().all(|p| p.mandate_id == mandate.id));
    }
}
