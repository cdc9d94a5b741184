//! Party DTOs
//!
//! Request bodies carry the type-specific details under `person` or
//! `organization` and the child facts as top-level arrays. Child records may
//! omit `partyId`; the owning party is assigned when the body becomes a
//! `Party`. Responses are the domain aggregates themselves.

use serde::Deserialize;

use core_kernel::{PartyId, TenantId};
use domain_party::{
    Attribute, ChildSet, Consent, ContactMechanism, ExternalReference, IdentityDocument,
    IndustryClassification, LanguageProficiency, Lock, Organization, Party, PartyRole,
    PartySegment, Person, Preference, Skill, SourceOfFunds, SourceOfWealth, Status, TaxNumber,
};

/// The child facts of a party write
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyFacts {
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
}

impl PartyFacts {
    /// Moves the facts onto `party` and re-parents them
    fn apply_to(self, party: &mut Party) {
        party.attributes = self.attributes;
        party.contact_mechanisms = self.contact_mechanisms;
        party.identity_documents = self.identity_documents;
        party.tax_numbers = self.tax_numbers;
        party.external_references = self.external_references;
        party.locks = self.locks;
        party.roles = self.roles;
        party.statuses = self.statuses;
        party.segments = self.segments;
        party.skills = self.skills;
        party.language_proficiencies = self.language_proficiencies;
        party.industry_classifications = self.industry_classifications;
        party.sources_of_funds = self.sources_of_funds;
        party.sources_of_wealth = self.sources_of_wealth;
        party.consents = self.consents;
        party.preferences = self.preferences;
        party.claim_children();
    }
}

/// Body of `POST /organizations` and `PUT /organizations/:id`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRequest {
    /// Client-chosen ID on create; a fresh one is generated when absent
    #[serde(default)]
    pub id: Option<PartyId>,
    pub organization: Organization,
    #[serde(flatten)]
    pub facts: PartyFacts,
}

impl OrganizationRequest {
    /// Builds the aggregate; `id` overrides the body's ID
    pub fn into_party(self, tenant_id: TenantId, id: Option<PartyId>) -> Party {
        let mut party = Party::new_organization(tenant_id, self.organization);
        if let Some(id) = id.or(self.id) {
            party.id = id;
        }
        self.facts.apply_to(&mut party);
        party
    }
}

/// Body of `POST /persons` and `PUT /persons/:id`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRequest {
    #[serde(default)]
    pub id: Option<PartyId>,
    pub person: Person,
    #[serde(flatten)]
    pub facts: PartyFacts,
}

impl PersonRequest {
    pub fn into_party(self, tenant_id: TenantId, id: Option<PartyId>) -> Party {
        let mut party = Party::new_person(tenant_id, self.person);
        if let Some(id) = id.or(self.id) {
            party.id = id;
        }
        self.facts.apply_to(&mut party);
        party
    }
}
