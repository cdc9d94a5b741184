//! Party validation rules
//!
//! This module provides validation for party aggregates, associations and
//! mandates, in two layers:
//!
//! 1. **Structural rules** (`PartyValidator::validate`) need nothing but the
//!    aggregate: field constraints, date sanity, effective periods, and the
//!    fit between child facts and the party type.
//! 2. **Catalog rules** (`PartyValidator::validate_against_catalogs`) check
//!    every coded fact against the tenant's reference data, including the
//!    party-type filter of scoped catalogs.
//!
//! # Validation Rules
//!
//! ## Persons
//! - Must have given name and family name
//! - Date of birth and date of death cannot be in the future
//! - Date of death cannot precede date of birth
//! - Cannot carry industry classifications
//!
//! ## Organizations
//! - Must have a name
//! - Incorporation date cannot be in the future
//! - Cannot carry skills or language proficiencies
//!
//! ## All parties
//! - Every child fact belongs to the party and has a consistent period
//! - Contact mechanism values match their sub-type's family
//! - At most one preferred contact mechanism per family (warning)

use std::collections::HashMap;

use chrono::Utc;
use validator::{Validate, ValidationErrors};

use crate::association::Association;
use crate::child::{ChildEntity, ChildSet, TimeBound};
use crate::contact_mechanism::{ContactMechanismType, ContactMechanismValue};
use crate::mandate::Mandate;
use crate::party::{Party, PartyDetails, PartyType};
use crate::reference::{CatalogIndex, CatalogKind};
use core_kernel::PartyId;

/// Result of party validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the party is valid
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Creates a failed validation result with errors
    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    /// Adds a warning to the result
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merges another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Records derive-level constraint failures under a label
    fn add_field_errors(&mut self, label: &str, outcome: Result<(), ValidationErrors>) {
        if let Err(errors) = outcome {
            for (field, kinds) in errors.field_errors() {
                for kind in kinds.iter() {
                    self.add_error(format!("{}.{}: {}", label, field, kind.code));
                }
            }
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Validator for parties, associations and mandates
///
/// # Examples
///
/// ```rust
/// use domain_party::validation::PartyValidator;
/// use domain_party::party::{Party, Person};
/// use core_kernel::TenantId;
///
/// let party = Party::new_person(TenantId::new(), Person::new("Grace", "Hopper"));
/// let result = PartyValidator::validate(&party);
///
/// assert!(result.is_valid, "{:?}", result.errors);
/// ```
pub struct PartyValidator;

impl PartyValidator {
    /// Validates the structure of a party
    ///
    /// # Arguments
    ///
    /// * `party` - The party to validate
    ///
    /// # Returns
    ///
    /// A `ValidationResult` containing any errors or warnings
    pub fn validate(party: &Party) -> ValidationResult {
        let mut result = ValidationResult::ok();

        Self::validate_children(party, &mut result);
        Self::validate_contact_mechanisms(party, &mut result);

        match &party.details {
            PartyDetails::Person(_) => Self::validate_person(party, &mut result),
            PartyDetails::Organization(_) => Self::validate_organization(party, &mut result),
        }

        result
    }

    fn validate_person(party: &Party, result: &mut ValidationResult) {
        let Some(person) = party.person() else {
            return;
        };
        result.add_field_errors("person", person.validate());

        if person.given_name.trim().is_empty() {
            result.add_error("Person given name is required");
        }
        if person.family_name.trim().is_empty() {
            result.add_error("Person family name is required");
        }

        let today = Utc::now().date_naive();
        if let Some(birth) = person.date_of_birth {
            if birth > today {
                result.add_error("Date of birth cannot be in the future");
            }
            if let Some(age) = person.age_on(today) {
                if age > 150 {
                    result.add_warning(format!("Unusual age: {} years", age));
                }
            }
        }
        if let Some(death) = person.date_of_death {
            if death > today {
                result.add_error("Date of death cannot be in the future");
            }
            if person.date_of_birth.map_or(false, |birth| death < birth) {
                result.add_error("Date of death cannot precede date of birth");
            }
        }

        if !party.industry_classifications.is_empty() {
            result.add_error("A person cannot have industry classifications");
        }
    }

    fn validate_organization(party: &Party, result: &mut ValidationResult) {
        let Some(organization) = party.organization() else {
            return;
        };
        result.add_field_errors("organization", organization.validate());

        if organization.name.trim().is_empty() {
            result.add_error("Organization name is required");
        }
        if let Some(incorporated) = organization.incorporation_date {
            if incorporated > Utc::now().date_naive() {
                result.add_error("Incorporation date cannot be in the future");
            }
        }

        if !party.skills.is_empty() {
            result.add_error("An organization cannot have skills");
        }
        if !party.language_proficiencies.is_empty() {
            result.add_error("An organization cannot have language proficiencies");
        }

        let primaries = party.industry_classifications.iter().filter(|c| c.primary).count();
        if primaries > 1 {
            result.add_warning("Multiple primary industry classifications found");
        }
    }

    fn validate_children(party: &Party, result: &mut ValidationResult) {
        check_owned(&party.attributes, party.id, "attribute", result);
        check_owned(&party.contact_mechanisms, party.id, "contact mechanism", result);
        check_owned(&party.identity_documents, party.id, "identity document", result);
        check_owned(&party.tax_numbers, party.id, "tax number", result);
        check_owned(&party.external_references, party.id, "external reference", result);
        check_owned(&party.locks, party.id, "lock", result);
        check_owned(&party.roles, party.id, "role", result);
        check_owned(&party.statuses, party.id, "status", result);
        check_owned(&party.segments, party.id, "segment", result);
        check_owned(&party.skills, party.id, "skill", result);
        check_owned(&party.language_proficiencies, party.id, "language proficiency", result);
        check_owned(&party.industry_classifications, party.id, "industry classification", result);
        check_owned(&party.sources_of_funds, party.id, "source of funds", result);
        check_owned(&party.sources_of_wealth, party.id, "source of wealth", result);
        check_owned(&party.consents, party.id, "consent", result);
        check_owned(&party.preferences, party.id, "preference", result);

        check_periods(&party.attributes, "attribute", result);
        check_periods(&party.contact_mechanisms, "contact mechanism", result);
        check_periods(&party.tax_numbers, "tax number", result);
        check_periods(&party.locks, "lock", result);
        check_periods(&party.roles, "role", result);
        check_periods(&party.statuses, "status", result);
        check_periods(&party.segments, "segment", result);
        check_periods(&party.skills, "skill", result);
        check_periods(&party.consents, "consent", result);

        for document in party.identity_documents.iter() {
            result.add_field_errors("identityDocument", document.validate());
            if let (Some(issued), Some(expires)) = (document.issue_date, document.expiry_date) {
                if expires < issued {
                    result.add_error(format!(
                        "Identity document {} expires before it was issued",
                        document.document_number
                    ));
                }
            }
        }
        for tax_number in party.tax_numbers.iter() {
            result.add_field_errors("taxNumber", tax_number.validate());
        }
        for reference in party.external_references.iter() {
            result.add_field_errors("externalReference", reference.validate());
        }
        for funds in party.sources_of_funds.iter() {
            result.add_field_errors("sourceOfFunds", funds.validate());
        }
        for wealth in party.sources_of_wealth.iter() {
            result.add_field_errors("sourceOfWealth", wealth.validate());
        }
    }

    fn validate_contact_mechanisms(party: &Party, result: &mut ValidationResult) {
        let mut preferred: HashMap<ContactMechanismType, usize> = HashMap::new();

        for mechanism in party.contact_mechanisms.iter() {
            if !mechanism.is_consistent() {
                result.add_error(format!(
                    "Contact mechanism {} does not hold a {:?} value",
                    mechanism.sub_type,
                    mechanism.sub_type.contact_mechanism_type()
                ));
            }
            match &mechanism.value {
                ContactMechanismValue::PhysicalAddress(address) => {
                    result.add_field_errors("physicalAddress", address.validate());
                }
                ContactMechanismValue::Telephone(number) => {
                    result.add_field_errors("telephone", number.validate());
                }
                ContactMechanismValue::Electronic { address } => {
                    if address.trim().is_empty() {
                        result.add_error(format!("Contact mechanism {} has an empty address", mechanism.sub_type));
                    }
                }
            }
            if mechanism.preferred {
                *preferred.entry(mechanism.sub_type.contact_mechanism_type()).or_default() += 1;
            }
        }

        for (kind, count) in preferred {
            if count > 1 {
                result.add_warning(format!("Multiple preferred {:?} contact mechanisms found", kind));
            }
        }
    }

    /// Checks every coded fact of a party against the tenant's catalogs
    ///
    /// Catalogs with no loaded rows are skipped.
    pub fn validate_against_catalogs(party: &Party, catalogs: &CatalogIndex) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let party_type = party.party_type();
        let mut scoped = |kind: CatalogKind, code: &str| {
            if let Err(violation) = catalogs.check(kind, code, party_type) {
                result.add_error(violation.to_string());
            }
        };

        for attribute in party.attributes.iter() {
            scoped(CatalogKind::AttributeType, &attribute.attribute_type);
        }
        for document in party.identity_documents.iter() {
            scoped(CatalogKind::IdentityDocumentType, &document.document_type);
        }
        for tax_number in party.tax_numbers.iter() {
            scoped(CatalogKind::TaxNumberType, &tax_number.tax_number_type);
        }
        for reference in party.external_references.iter() {
            scoped(CatalogKind::ExternalReferenceType, &reference.reference_type);
        }
        for lock in party.locks.iter() {
            scoped(CatalogKind::LockType, &lock.lock_type);
        }
        for role in party.roles.iter() {
            scoped(CatalogKind::RoleType, &role.role_type);
        }
        for status in party.statuses.iter() {
            scoped(CatalogKind::StatusType, &status.status_type);
        }
        for segment in party.segments.iter() {
            scoped(CatalogKind::Segment, &segment.segment);
        }
        for consent in party.consents.iter() {
            scoped(CatalogKind::ConsentType, &consent.consent_type);
        }
        for preference in party.preferences.iter() {
            scoped(CatalogKind::PreferenceType, &preference.preference_type);
        }

        let mut unscoped = |kind: CatalogKind, code: &str| {
            if let Err(violation) = catalogs.check_code(kind, code) {
                result.add_error(violation.to_string());
            }
        };

        for skill in party.skills.iter() {
            unscoped(CatalogKind::QualificationType, &skill.qualification_type);
        }
        for classification in party.industry_classifications.iter() {
            unscoped(CatalogKind::IndustryClassificationCategory, &classification.category);
        }
        for mechanism in party.contact_mechanisms.iter() {
            if let ContactMechanismValue::PhysicalAddress(address) = &mechanism.value {
                if let Some(code) = &address.address_type {
                    unscoped(CatalogKind::PhysicalAddressType, code);
                }
                if let Some(code) = &address.address_role {
                    unscoped(CatalogKind::PhysicalAddressRole, code);
                }
            }
        }
        if let Some(person) = party.person() {
            let coded = [
                (CatalogKind::Gender, &person.gender),
                (CatalogKind::ResidencyStatus, &person.residency_status),
                (CatalogKind::ResidentialType, &person.residential_type),
            ];
            for (kind, code) in coded {
                if let Some(code) = code {
                    unscoped(kind, code);
                }
            }
        }

        for attribute in party.attributes.iter() {
            if let Some(expected) = catalogs.attribute_data_type(&attribute.attribute_type) {
                if attribute.value.data_type() != expected {
                    result.add_error(format!(
                        "Attribute {} expects a {} value but holds {}",
                        attribute.attribute_type,
                        expected.code(),
                        attribute.value.data_type().code()
                    ));
                }
            }
        }

        for tax_number in party.tax_numbers.iter() {
            let Some(tax_type) = catalogs.tax_number_type(&tax_number.tax_number_type) else {
                continue;
            };
            if let Some(country) = &tax_type.country {
                if !country.eq_ignore_ascii_case(&tax_number.country) {
                    result.add_error(format!(
                        "Tax number {} is issued in {} but was given for {}",
                        tax_number.tax_number_type, country, tax_number.country
                    ));
                }
            }
            match tax_type.accepts(&tax_number.tax_number) {
                Ok(true) => {}
                Ok(false) => result.add_error(format!(
                    "Tax number {} does not match the format of {}",
                    tax_number.tax_number, tax_number.tax_number_type
                )),
                Err(e) => result.add_error(format!(
                    "Tax number type {} has an invalid pattern: {}",
                    tax_number.tax_number_type, e
                )),
            }
        }

        result
    }

    /// Validates an association between two loaded parties
    ///
    /// # Arguments
    ///
    /// * `association` - The association to validate
    /// * `from` - The party at the `from` end
    /// * `to` - The party at the `to` end
    /// * `catalogs` - The tenant's reference data
    pub fn validate_association(
        association: &Association,
        from: &Party,
        to: &Party,
        catalogs: &CatalogIndex,
    ) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if association.association_type.trim().is_empty() {
            result.add_error("Association type is required");
        }
        if association.from_party_id == association.to_party_id {
            result.add_error("A party cannot be associated with itself");
        }
        if from.id != association.from_party_id || to.id != association.to_party_id {
            result.add_error("Association ends do not match the supplied parties");
        }
        if from.tenant_id != association.tenant_id || to.tenant_id != association.tenant_id {
            result.add_error("Associated parties must belong to the association's tenant");
        }
        if !association.period.is_valid() {
            result.add_error("Association period starts after it ends");
        }
        if let Err(violation) =
            catalogs.check(CatalogKind::AssociationType, &association.association_type, from.party_type())
        {
            result.add_error(violation.to_string());
        }

        result
    }

    /// Validates a mandate and its properties
    pub fn validate_mandate(mandate: &Mandate, catalogs: &CatalogIndex) -> ValidationResult {
        let mut result = ValidationResult::ok();

        if mandate.mandate_type.trim().is_empty() {
            result.add_error("Mandate type is required");
        }
        if !mandate.period.is_valid() {
            result.add_error("Mandate period starts after it ends");
        }
        if mandate.mandataries.is_empty() {
            result.add_warning("Mandate has no mandataries");
        }

        for mandatary in mandate.mandataries.iter() {
            if mandatary.owner() != mandate.id {
                result.add_error(format!("Mandatary {} belongs to another mandate", mandatary.party_id));
            }
            if mandatary.party_id == mandate.party_id {
                result.add_error("The mandating party cannot be its own mandatary");
            }
            if !mandatary.period().is_valid() {
                result.add_error(format!("Mandatary {} period starts after it ends", mandatary.party_id));
            }
            if let Err(violation) = catalogs.check_code(CatalogKind::MandataryType, &mandatary.mandatary_type) {
                result.add_error(violation.to_string());
            }
            if let Err(violation) = catalogs.check_code(CatalogKind::MandataryRole, &mandatary.mandatary_role) {
                result.add_error(violation.to_string());
            }
        }

        for property in mandate.properties.iter() {
            if property.owner() != mandate.id {
                result.add_error(format!("Property {} belongs to another mandate", property.property_type));
            }
        }
        for violation in mandate.validate_properties(catalogs.mandate_property_types()) {
            result.add_error(violation.to_string());
        }

        result
    }

    /// Returns true if the party type may be used where `expected` is required
    pub fn is_party_type(party: &Party, expected: PartyType) -> bool {
        party.party_type() == expected
    }
}

fn check_owned<T>(set: &ChildSet<T>, owner: PartyId, label: &str, result: &mut ValidationResult)
where
    T: ChildEntity<Owner = PartyId>,
{
    if set.iter().any(|child| child.owner() != owner) {
        result.add_error(format!("A {} belongs to another party", label));
    }
}

fn check_periods<T: TimeBound>(set: &ChildSet<T>, label: &str, result: &mut ValidationResult) {
    if set.iter().any(|child| !child.period().is_valid()) {
        result.add_error(format!("A {} period starts after it ends", label));
    }
}
