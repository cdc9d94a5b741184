//! Child fact tables
//!
//! Every family of party facts lives in its own `party_*` table with the same
//! shape: the owning party, the type code and optional sub-key that make up
//! the composite key, the effective period (when the fact has one) and the
//! whole fact as JSONB. `ChildRow` says how a domain record fills those
//! columns; the functions below read and write a whole `ChildSet` at once.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{EffectivePeriod, PartyId};
use domain_party::attribute::Attribute;
use domain_party::child::{ChildEntity, ChildSet};
use domain_party::consent::{Consent, Preference};
use domain_party::contact_mechanism::ContactMechanism;
use domain_party::document::{ExternalReference, IdentityDocument, TaxNumber};
use domain_party::funds::{SourceOfFunds, SourceOfWealth};
use domain_party::profile::{IndustryClassification, LanguageProficiency, Skill};
use domain_party::status::{Lock, PartyRole, PartySegment, Status};
use domain_party::Party;

use crate::error::DatabaseError;

/// A party fact stored in one of the child tables
pub trait ChildRow:
    ChildEntity<Owner = PartyId> + Serialize + DeserializeOwned + Send + Unpin + 'static
{
    /// The table holding this family of facts
    const TABLE: &'static str;

    /// The `type_code` column
    fn type_code(&self) -> String;

    /// The `sub_key` column, for families keyed by more than a type code
    fn sub_key(&self) -> String {
        String::new()
    }

    /// The effective period, for facts that have one
    fn valid_period(&self) -> Option<&EffectivePeriod> {
        None
    }
}

macro_rules! child_row {
    ($ty:ty, $table:literal, $field:ident) => {
        impl ChildRow for $ty {
            const TABLE: &'static str = $table;

            fn type_code(&self) -> String {
                self.$field.to_string()
            }
        }
    };
    ($ty:ty, $table:literal, $field:ident, timed) => {
        impl ChildRow for $ty {
            const TABLE: &'static str = $table;

            fn type_code(&self) -> String {
                self.$field.to_string()
            }

            fn valid_period(&self) -> Option<&EffectivePeriod> {
                Some(&self.period)
            }
        }
    };
}

child_row!(Attribute, "party_attributes", attribute_type, timed);
child_row!(ExternalReference, "party_external_references", reference_type);
child_row!(Lock, "party_locks", lock_type, timed);
child_row!(PartyRole, "party_roles", role_type, timed);
child_row!(Status, "party_statuses", status_type, timed);
child_row!(PartySegment, "party_segments", segment, timed);
child_row!(Skill, "party_skills", qualification_type, timed);
child_row!(LanguageProficiency, "party_language_proficiencies", language);
child_row!(IndustryClassification, "party_industry_classifications", category);
child_row!(SourceOfFunds, "party_sources_of_funds", source_type);
child_row!(SourceOfWealth, "party_sources_of_wealth", source_type);
child_row!(Consent, "party_consents", consent_type, timed);
child_row!(Preference, "party_preferences", preference_type);

impl ChildRow for ContactMechanism {
    const TABLE: &'static str = "party_contact_mechanisms";

    fn type_code(&self) -> String {
        self.sub_type.code().to_string()
    }

    fn sub_key(&self) -> String {
        self.sequence.to_string()
    }

    fn valid_period(&self) -> Option<&EffectivePeriod> {
        Some(&self.period)
    }
}

impl ChildRow for IdentityDocument {
    const TABLE: &'static str = "party_identity_documents";

    fn type_code(&self) -> String {
        self.document_type.clone()
    }

    fn sub_key(&self) -> String {
        self.document_number.clone()
    }
}

impl ChildRow for TaxNumber {
    const TABLE: &'static str = "party_tax_numbers";

    fn type_code(&self) -> String {
        self.tax_number_type.clone()
    }

    fn sub_key(&self) -> String {
        self.country.clone()
    }

    fn valid_period(&self) -> Option<&EffectivePeriod> {
        Some(&self.period)
    }
}

/// Every child table, in the order facts are written
pub const CHILD_TABLES: [&str; 16] = [
    Attribute::TABLE,
    ContactMechanism::TABLE,
    IdentityDocument::TABLE,
    TaxNumber::TABLE,
    ExternalReference::TABLE,
    Lock::TABLE,
    PartyRole::TABLE,
    Status::TABLE,
    PartySegment::TABLE,
    Skill::TABLE,
    LanguageProficiency::TABLE,
    IndustryClassification::TABLE,
    SourceOfFunds::TABLE,
    SourceOfWealth::TABLE,
    Consent::TABLE,
    Preference::TABLE,
];

/// Column values of one child row, ready to bind
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRecord {
    pub type_code: String,
    pub sub_key: String,
    pub position: i32,
    pub valid_from: Option<chrono::NaiveDate>,
    pub valid_to: Option<chrono::NaiveDate>,
    pub payload: serde_json::Value,
}

impl ChildRecord {
    pub fn of<T: ChildRow>(item: &T, position: usize) -> Result<Self, DatabaseError> {
        let period = item.valid_period();
        Ok(Self {
            type_code: item.type_code(),
            sub_key: item.sub_key(),
            position: i32::try_from(position).unwrap_or(i32::MAX),
            valid_from: period.and_then(|p| p.from),
            valid_to: period.and_then(|p| p.to),
            payload: serde_json::to_value(item)?,
        })
    }
}

/// Inserts every record of a set
pub async fn insert_children<T: ChildRow>(
    conn: &mut PgConnection,
    party_id: Uuid,
    items: &ChildSet<T>,
) -> Result<(), DatabaseError> {
    if items.is_empty() {
        return Ok(());
    }

    let records = items
        .iter()
        .enumerate()
        .map(|(position, item)| ChildRecord::of(item, position))
        .collect::<Result<Vec<_>, _>>()?;

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "INSERT INTO {} (party_id, type_code, sub_key, position, valid_from, valid_to, payload) ",
        T::TABLE
    ));
    builder.push_values(records, |mut row, record| {
        row.push_bind(party_id)
            .push_bind(record.type_code)
            .push_bind(record.sub_key)
            .push_bind(record.position)
            .push_bind(record.valid_from)
            .push_bind(record.valid_to)
            .push_bind(record.payload);
    });
    builder.build().execute(&mut *conn).await?;

    Ok(())
}

/// Loads a party's records of one family, in their stored order
pub async fn load_children<T: ChildRow>(
    conn: &mut PgConnection,
    party_id: Uuid,
) -> Result<ChildSet<T>, DatabaseError> {
    let sql = format!(
        "SELECT payload FROM {} WHERE party_id = $1 ORDER BY position, type_code, sub_key",
        T::TABLE
    );
    let rows = sqlx::query_scalar::<_, Json<T>>(&sql)
        .bind(party_id)
        .fetch_all(&mut *conn)
        .await?;

    Ok(rows.into_iter().map(|Json(item)| item).collect())
}

/// Removes every child row of a party
pub async fn delete_children(conn: &mut PgConnection, party_id: Uuid) -> Result<(), DatabaseError> {
    for table in CHILD_TABLES {
        let sql = format!("DELETE FROM {} WHERE party_id = $1", table);
        sqlx::query(&sql).bind(party_id).execute(&mut *conn).await?;
    }
    Ok(())
}

/// Writes all child sets of a party
pub async fn insert_all(conn: &mut PgConnection, party: &Party) -> Result<(), DatabaseError> {
    let id = *party.id.as_uuid();
    insert_children(conn, id, &party.attributes).await?;
    insert_children(conn, id, &party.contact_mechanisms).await?;
    insert_children(conn, id, &party.identity_documents).await?;
    insert_children(conn, id, &party.tax_numbers).await?;
    insert_children(conn, id, &party.external_references).await?;
    insert_children(conn, id, &party.locks).await?;
    insert_children(conn, id, &party.roles).await?;
    insert_children(conn, id, &party.statuses).await?;
    insert_children(conn, id, &party.segments).await?;
    insert_children(conn, id, &party.skills).await?;
    insert_children(conn, id, &party.language_proficiencies).await?;
    insert_children(conn, id, &party.industry_classifications).await?;
    insert_children(conn, id, &party.sources_of_funds).await?;
    insert_children(conn, id, &party.sources_of_wealth).await?;
    insert_children(conn, id, &party.consents).await?;
    insert_children(conn, id, &party.preferences).await?;
    Ok(())
}

/// Fills every child set of `party` from the database
pub async fn load_all(conn: &mut PgConnection, party: &mut Party) -> Result<(), DatabaseError> {
    let id = *party.id.as_uuid();
    party.attributes = load_children(conn, id).await?;
    party.contact_mechanisms = load_children(conn, id).await?;
    party.identity_documents = load_children(conn, id).await?;
    party.tax_numbers = load_children(conn, id).await?;
    party.external_references = load_children(conn, id).await?;
    party.locks = load_children(conn, id).await?;
    party.roles = load_children(conn, id).await?;
    party.statuses = load_children(conn, id).await?;
    party.segments = load_children(conn, id).await?;
    party.skills = load_children(conn, id).await?;
    party.language_proficiencies = load_children(conn, id).await?;
    party.industry_classifications = load_children(conn, id).await?;
    party.sources_of_funds = load_children(conn, id).await?;
    party.sources_of_wealth = load_children(conn, id).await?;
    party.consents = load_children(conn, id).await?;
    party.preferences = load_children(conn, id).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain_party::contact_mechanism::ContactMechanismSubType;

    #[test]
    fn test_contact_mechanism_columns() {
        let party_id = PartyId::new();
        let mut mechanism =
            ContactMechanism::email(party_id, ContactMechanismSubType::WorkEmail, "ada@example.com");
        mechanism.sequence = 2;

        let record = ChildRecord::of(&mechanism, 0).unwrap();
        assert_eq!(record.type_code, ContactMechanismSubType::WorkEmail.code());
        assert_eq!(record.sub_key, "2");
        assert_eq!(record.valid_from, None);
    }

    #[test]
    fn test_timed_row_carries_period() {
        let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let lock = Lock::new(PartyId::new(), "FRAUD", EffectivePeriod::starting(from));

        let record = ChildRecord::of(&lock, 3).unwrap();
        assert_eq!(record.type_code, "FRAUD");
        assert_eq!(record.sub_key, "");
        assert_eq!(record.position, 3);
        assert_eq!(record.valid_from, Some(from));
        assert_eq!(record.valid_to, None);
        assert_eq!(record.payload["lockType"], "FRAUD");
    }

    #[test]
    fn test_payload_restores_record() {
        let lock = Lock::new(PartyId::new(), "AML", EffectivePeriod::open());
        let record = ChildRecord::of(&lock, 0).unwrap();
        let restored: Lock = serde_json::from_value(record.payload).unwrap();
        assert_eq!(restored, lock);
    }

    #[test]
    fn test_child_tables_are_distinct() {
        let mut tables = CHILD_TABLES.to_vec();
        tables.sort_unstable();
        tables.dedup();
        assert_eq!(tables.len(), CHILD_TABLES.len());
        assert!(tables.iter().all(|t| t.starts_with("party_")));
    }

    #[test]
    fn test_document_and_language_keys() {
        let party_id = PartyId::new();
        let passport = IdentityDocument::new(party_id, "PASSPORT", "X1234567");
        let record = ChildRecord::of(&passport, 0).unwrap();
        assert_eq!((record.type_code.as_str(), record.sub_key.as_str()), ("PASSPORT", "X1234567"));

        let language = LanguageProficiency::new(
            party_id,
            "de-CH".parse().unwrap(),
            domain_party::ProficiencyLevel::Fluent,
        );
        assert_eq!(ChildRecord::of(&language, 0).unwrap().type_code, "de-CH");
    }
}
