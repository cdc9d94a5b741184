//! Party repository implementation
//!
//! This module provides database access for party root records and their
//! child facts. A party is written in one transaction: the root row in
//! `parties`, every child set into its own table, then the snapshot and
//! history rows of the write. Updates replace the child sets wholesale.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{AuditStamps, PageRequest, PartyId, SortDirection, TenantId};
use domain_party::{Party, PartyAudit, PartyDetails, PartyQuery};

use super::{audit, children};
use crate::error::DatabaseError;

const PARTY_COLUMNS: &str = "party_id, tenant_id, party_type, display_name, details, \
     created_at, updated_at, created_by, updated_by";

/// Repository for party aggregates
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: PgPool,
}

impl PartyRepository {
    /// Creates a new PartyRepository with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a party, all of its child facts and its audit rows
    ///
    /// # Returns
    ///
    /// `DatabaseError::DuplicateEntry` if the party ID is taken
    pub async fn insert(&self, party: &Party, party_audit: &PartyAudit) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO parties (
                party_id, tenant_id, party_type, display_name, details,
                created_at, updated_at, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(party.id.as_uuid())
        .bind(party.tenant_id.as_uuid())
        .bind(party.party_type().code())
        .bind(party.display_name())
        .bind(Json(&party.details))
        .bind(party.audit.created_at)
        .bind(party.audit.updated_at)
        .bind(party.audit.created_by.as_deref())
        .bind(party.audit.updated_by.as_deref())
        .execute(&mut *tx)
        .await?;

        children::insert_all(&mut tx, party).await?;
        audit::insert_audit(&mut tx, party_audit).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Retrieves a party with its child facts
    ///
    /// # Returns
    ///
    /// The party, or `DatabaseError::NotFound` if it does not exist in the tenant
    pub async fn get(&self, tenant_id: TenantId, party_id: PartyId) -> Result<Party, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "SELECT {} FROM parties WHERE party_id = $1 AND tenant_id = $2",
            PARTY_COLUMNS
        );
        let row = sqlx::query_as::<_, PartyRow>(&sql)
            .bind(party_id.as_uuid())
            .bind(tenant_id.as_uuid())
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Party", party_id))?;

        let mut party = row.into_party();
        children::load_all(&mut conn, &mut party).await?;
        Ok(party)
    }

    /// Replaces the root record and every child set, and appends the audit
    /// rows
    ///
    /// # Returns
    ///
    /// `DatabaseError::NotFound` if the party does not exist in the tenant
    pub async fn update(&self, party: &Party, party_audit: &PartyAudit) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE parties
            SET party_type = $3,
                display_name = $4,
                details = $5,
                updated_at = $6,
                updated_by = $7
            WHERE party_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(party.id.as_uuid())
        .bind(party.tenant_id.as_uuid())
        .bind(party.party_type().code())
        .bind(party.display_name())
        .bind(Json(&party.details))
        .bind(party.audit.updated_at)
        .bind(party.audit.updated_by.as_deref())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Party", party.id));
        }

        let id = *party.id.as_uuid();
        children::delete_children(&mut tx, id).await?;
        children::insert_all(&mut tx, party).await?;
        audit::insert_audit(&mut tx, party_audit).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Deletes a party
    ///
    /// Child facts, associations, owned mandates and mandatary entries go
    /// with it through `ON DELETE CASCADE`. Earlier audit rows are kept and
    /// the deletion's own rows are appended in the same transaction.
    pub async fn delete(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        party_audit: &PartyAudit,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM parties WHERE party_id = $1 AND tenant_id = $2")
            .bind(party_id.as_uuid())
            .bind(tenant_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Party", party_id));
        }
        audit::insert_audit(&mut tx, party_audit).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Checks if a party exists in the tenant
    pub async fn exists(&self, tenant_id: TenantId, party_id: PartyId) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM parties WHERE party_id = $1 AND tenant_id = $2)",
        )
        .bind(party_id.as_uuid())
        .bind(tenant_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Finds parties matching `query`, returning one page and the total match count
    pub async fn find(
        &self,
        tenant_id: TenantId,
        query: &PartyQuery,
        page: &PageRequest,
    ) -> Result<(Vec<Party>, u64), DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let mut count: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM parties p");
        push_filters(&mut count, tenant_id, query);
        let total: i64 = count.build_query_scalar().fetch_one(&mut *conn).await?;

        let mut select: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        select.push(PARTY_COLUMNS).push(" FROM parties p");
        push_filters(&mut select, tenant_id, query);
        select.push(order_by(page));
        select.push(" LIMIT ").push_bind(i64::from(page.limit));
        select.push(" OFFSET ").push_bind(i64::from(page.offset));

        let rows: Vec<PartyRow> = select.build_query_as().fetch_all(&mut *conn).await?;

        let mut parties = Vec::with_capacity(rows.len());
        for row in rows {
            let mut party = row.into_party();
            children::load_all(&mut conn, &mut party).await?;
            parties.push(party);
        }

        Ok((parties, u64::try_from(total).unwrap_or(0)))
    }
}

/// Appends the WHERE clause for a party query
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, tenant_id: TenantId, query: &PartyQuery) {
    builder.push(" WHERE p.tenant_id = ").push_bind(*tenant_id.as_uuid());

    if let Some(party_type) = query.party_type {
        builder.push(" AND p.party_type = ").push_bind(party_type.code());
    }

    if let Some(fragment) = &query.name_contains {
        let pattern = format!("%{}%", escape_like(fragment));
        builder
            .push(" AND (p.display_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR p.details ->> 'legalName' ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some((reference_type, value)) = &query.external_reference {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM party_external_references r \
                 WHERE r.party_id = p.party_id AND r.type_code = ",
            )
            .push_bind(reference_type.clone())
            .push(" AND r.payload ->> 'value' = ")
            .push_bind(value.clone())
            .push(")");
    }

    if let Some(segment) = &query.segment {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM party_segments s \
                 WHERE s.party_id = p.party_id AND s.type_code = ",
            )
            .push_bind(segment.clone())
            .push(
                " AND (s.valid_from IS NULL OR s.valid_from <= CURRENT_DATE) \
                 AND (s.valid_to IS NULL OR s.valid_to >= CURRENT_DATE))",
            );
    }
}

/// Builds the ORDER BY clause from the requested sort, falling back to
/// creation order
///
/// Only known fields reach the SQL; anything else is ignored.
pub(crate) fn order_by(page: &PageRequest) -> String {
    let mut terms: Vec<String> = page
        .sort
        .iter()
        .filter_map(|order| {
            let column = match order.field.as_str() {
                "displayName" | "name" => "lower(p.display_name)",
                "createdAt" => "p.created_at",
                "updatedAt" => "p.updated_at",
                "partyType" => "p.party_type",
                _ => return None,
            };
            let direction = match order.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            Some(format!("{} {}", column, direction))
        })
        .collect();
    terms.push("p.created_at ASC".to_string());
    terms.push("p.party_id ASC".to_string());
    format!(" ORDER BY {}", terms.join(", "))
}

/// Escapes LIKE wildcards so a name fragment matches literally
pub(crate) fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Database row for a party root record
#[derive(Debug, Clone, FromRow)]
pub struct PartyRow {
    pub party_id: Uuid,
    pub tenant_id: Uuid,
    pub party_type: String,
    pub display_name: String,
    pub details: Json<PartyDetails>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl PartyRow {
    /// Builds the aggregate root with empty child sets
    pub fn into_party(self) -> Party {
        let tenant_id = TenantId::from_uuid(self.tenant_id);
        let mut party = match self.details.0 {
            PartyDetails::Person(person) => Party::new_person(tenant_id, person),
            PartyDetails::Organization(organization) => Party::new_organization(tenant_id, organization),
        };
        party.id = PartyId::from_uuid(self.party_id);
        party.audit = AuditStamps {
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            updated_by: self.updated_by,
        };
        party
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::SortOrder;
    use domain_party::{Organization, PartyType};
    use proptest::prelude::*;

    fn unescape_like(escaped: &str) -> String {
        let mut chars = escaped.chars();
        let mut plain = String::new();
        while let Some(c) = chars.next() {
            if c == '\\' {
                plain.extend(chars.next());
            } else {
                plain.push(c);
            }
        }
        plain
    }

    proptest! {
        #[test]
        fn escaped_fragments_round_trip(fragment in "[a-z%_\\\\ ]{0,20}") {
            let escaped = escape_like(&fragment);
            prop_assert_eq!(unescape_like(&escaped), fragment);
        }

        #[test]
        fn sort_fields_never_reach_sql(field in "[ -~]{0,30}", descending in any::<bool>()) {
            let order = if descending {
                SortOrder::descending(field.clone())
            } else {
                SortOrder::ascending(field.clone())
            };
            let sql = order_by(&PageRequest::default().sorted_by(order));
            prop_assert!(sql.ends_with("p.created_at ASC, p.party_id ASC"));
            prop_assert!(!sql.contains(';'));
            prop_assert!(!sql.contains('\''));
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("Acme"), "Acme");
        assert_eq!(escape_like("100%_sure\\"), "100\\%\\_sure\\\\");
    }

    #[test]
    fn test_order_by_defaults_to_creation_order() {
        let page = PageRequest::default();
        assert_eq!(order_by(&page), " ORDER BY p.created_at ASC, p.party_id ASC");
    }

    #[test]
    fn test_order_by_ignores_unknown_fields() {
        let page = PageRequest::default()
            .sorted_by(SortOrder::descending("displayName"))
            .sorted_by(SortOrder::ascending("password; DROP TABLE parties"));
        assert_eq!(
            order_by(&page),
            " ORDER BY lower(p.display_name) DESC, p.created_at ASC, p.party_id ASC"
        );
    }

    #[test]
    fn test_row_into_party() {
        let party_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();
        let now = Utc::now();
        let row = PartyRow {
            party_id,
            tenant_id,
            party_type: "ORGANIZATION".to_string(),
            display_name: "Acme".to_string(),
            details: Json(PartyDetails::Organization(Organization::new("Acme"))),
            created_at: now,
            updated_at: now,
            created_by: Some("loader".to_string()),
            updated_by: None,
        };

        let party = row.into_party();
        assert_eq!(*party.id.as_uuid(), party_id);
        assert_eq!(*party.tenant_id.as_uuid(), tenant_id);
        assert_eq!(party.party_type(), PartyType::Organization);
        assert_eq!(party.audit.created_by.as_deref(), Some("loader"));
        assert!(party.attributes.is_empty());
    }
}
