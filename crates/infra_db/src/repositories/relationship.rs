//! Association and mandate repositories
//!
//! Associations are flat rows. A mandate is stored as its root row plus its
//! mandataries and properties, which are replaced wholesale on update.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{
    AssociationId, AuditStamps, EffectivePeriod, MandateId, PageRequest, PartyId, TenantId,
};
use domain_party::{Association, Mandatary, Mandate, MandateProperty};

use crate::error::DatabaseError;

/// Repository for associations between parties
#[derive(Debug, Clone)]
pub struct AssociationRepository {
    pool: PgPool,
}

impl AssociationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an association
    ///
    /// # Returns
    ///
    /// `DatabaseError::DuplicateEntry` if the ID or the natural key is taken,
    /// `DatabaseError::ForeignKeyViolation` if either party is missing
    pub async fn insert(&self, association: &Association) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO associations (
                association_id, tenant_id, association_type, from_party_id, to_party_id,
                valid_from, valid_to, created_at, updated_at, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(association.id.as_uuid())
        .bind(association.tenant_id.as_uuid())
        .bind(&association.association_type)
        .bind(association.from_party_id.as_uuid())
        .bind(association.to_party_id.as_uuid())
        .bind(association.period.from)
        .bind(association.period.to)
        .bind(association.audit.created_at)
        .bind(association.audit.updated_at)
        .bind(association.audit.created_by.as_deref())
        .bind(association.audit.updated_by.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(
        &self,
        tenant_id: TenantId,
        id: AssociationId,
    ) -> Result<Association, DatabaseError> {
        let row = sqlx::query_as::<_, AssociationRow>(
            r#"
            SELECT association_id, tenant_id, association_type, from_party_id, to_party_id,
                   valid_from, valid_to, created_at, updated_at, created_by, updated_by
            FROM associations
            WHERE association_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Association", id))?;

        Ok(row.into())
    }

    pub async fn update(&self, association: &Association) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE associations
            SET association_type = $3,
                from_party_id = $4,
                to_party_id = $5,
                valid_from = $6,
                valid_to = $7,
                updated_at = $8,
                updated_by = $9
            WHERE association_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(association.id.as_uuid())
        .bind(association.tenant_id.as_uuid())
        .bind(&association.association_type)
        .bind(association.from_party_id.as_uuid())
        .bind(association.to_party_id.as_uuid())
        .bind(association.period.from)
        .bind(association.period.to)
        .bind(association.audit.updated_at)
        .bind(association.audit.updated_by.as_deref())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Association", association.id));
        }
        Ok(())
    }

    pub async fn delete(&self, tenant_id: TenantId, id: AssociationId) -> Result<(), DatabaseError> {
        let result =
            sqlx::query("DELETE FROM associations WHERE association_id = $1 AND tenant_id = $2")
                .bind(id.as_uuid())
                .bind(tenant_id.as_uuid())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Association", id));
        }
        Ok(())
    }

    /// Lists the associations a party takes part in, from either end
    pub async fn find_for_party(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: &PageRequest,
    ) -> Result<(Vec<Association>, u64), DatabaseError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM associations
            WHERE tenant_id = $1 AND (from_party_id = $2 OR to_party_id = $2)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(party_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, AssociationRow>(
            r#"
            SELECT association_id, tenant_id, association_type, from_party_id, to_party_id,
                   valid_from, valid_to, created_at, updated_at, created_by, updated_by
            FROM associations
            WHERE tenant_id = $1 AND (from_party_id = $2 OR to_party_id = $2)
            ORDER BY association_type, association_id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(party_id.as_uuid())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await?;

        Ok((
            rows.into_iter().map(Association::from).collect(),
            u64::try_from(total).unwrap_or(0),
        ))
    }
}

/// Database row for an association
#[derive(Debug, Clone, FromRow)]
pub struct AssociationRow {
    pub association_id: Uuid,
    pub tenant_id: Uuid,
    pub association_type: String,
    pub from_party_id: Uuid,
    pub to_party_id: Uuid,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl From<AssociationRow> for Association {
    fn from(row: AssociationRow) -> Self {
        Association {
            id: AssociationId::from_uuid(row.association_id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            association_type: row.association_type,
            from_party_id: PartyId::from_uuid(row.from_party_id),
            to_party_id: PartyId::from_uuid(row.to_party_id),
            period: EffectivePeriod {
                from: row.valid_from,
                to: row.valid_to,
            },
            audit: AuditStamps {
                created_at: row.created_at,
                updated_at: row.updated_at,
                created_by: row.created_by,
                updated_by: row.updated_by,
            },
        }
    }
}

/// Repository for mandates with their mandataries and properties
#[derive(Debug, Clone)]
pub struct MandateRepository {
    pool: PgPool,
}

impl MandateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a mandate with its mandataries and properties
    pub async fn insert(&self, mandate: &Mandate) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO mandates (
                mandate_id, tenant_id, party_id, mandate_type, description,
                valid_from, valid_to, created_at, updated_at, created_by, updated_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(mandate.id.as_uuid())
        .bind(mandate.tenant_id.as_uuid())
        .bind(mandate.party_id.as_uuid())
        .bind(&mandate.mandate_type)
        .bind(mandate.description.as_deref())
        .bind(mandate.period.from)
        .bind(mandate.period.to)
        .bind(mandate.audit.created_at)
        .bind(mandate.audit.updated_at)
        .bind(mandate.audit.created_by.as_deref())
        .bind(mandate.audit.updated_by.as_deref())
        .execute(&mut *tx)
        .await?;

        insert_mandate_children(&mut tx, mandate).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get(&self, tenant_id: TenantId, id: MandateId) -> Result<Mandate, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, MandateRow>(
            r#"
            SELECT mandate_id, tenant_id, party_id, mandate_type, description,
                   valid_from, valid_to, created_at, updated_at, created_by, updated_by
            FROM mandates
            WHERE mandate_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(tenant_id.as_uuid())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Mandate", id))?;

        load_mandate(&mut conn, row).await
    }

    pub async fn update(&self, mandate: &Mandate) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE mandates
            SET party_id = $3,
                mandate_type = $4,
                description = $5,
                valid_from = $6,
                valid_to = $7,
                updated_at = $8,
                updated_by = $9
            WHERE mandate_id = $1 AND tenant_id = $2
            "#,
        )
        .bind(mandate.id.as_uuid())
        .bind(mandate.tenant_id.as_uuid())
        .bind(mandate.party_id.as_uuid())
        .bind(&mandate.mandate_type)
        .bind(mandate.description.as_deref())
        .bind(mandate.period.from)
        .bind(mandate.period.to)
        .bind(mandate.audit.updated_at)
        .bind(mandate.audit.updated_by.as_deref())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Mandate", mandate.id));
        }

        sqlx::query("DELETE FROM mandataries WHERE mandate_id = $1")
            .bind(mandate.id.as_uuid())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM mandate_properties WHERE mandate_id = $1")
            .bind(mandate.id.as_uuid())
            .execute(&mut *tx)
            .await?;
        insert_mandate_children(&mut tx, mandate).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, tenant_id: TenantId, id: MandateId) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM mandates WHERE mandate_id = $1 AND tenant_id = $2")
            .bind(id.as_uuid())
            .bind(tenant_id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Mandate", id));
        }
        Ok(())
    }

    /// Lists the mandates granted by a party
    pub async fn find_for_party(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: &PageRequest,
    ) -> Result<(Vec<Mandate>, u64), DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM mandates WHERE tenant_id = $1 AND party_id = $2",
        )
        .bind(tenant_id.as_uuid())
        .bind(party_id.as_uuid())
        .fetch_one(&mut *conn)
        .await?;

        let rows = sqlx::query_as::<_, MandateRow>(
            r#"
            SELECT mandate_id, tenant_id, party_id, mandate_type, description,
                   valid_from, valid_to, created_at, updated_at, created_by, updated_by
            FROM mandates
            WHERE tenant_id = $1 AND party_id = $2
            ORDER BY mandate_id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(party_id.as_uuid())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&mut *conn)
        .await?;

        let mut mandates = Vec::with_capacity(rows.len());
        for row in rows {
            mandates.push(load_mandate(&mut conn, row).await?);
        }
        Ok((mandates, u64::try_from(total).unwrap_or(0)))
    }
}

async fn insert_mandate_children(
    conn: &mut PgConnection,
    mandate: &Mandate,
) -> Result<(), DatabaseError> {
    let mandate_id = *mandate.id.as_uuid();

    if !mandate.mandataries.is_empty() {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO mandataries (mandate_id, party_id, mandatary_role, mandatary_type, valid_from, valid_to) ",
        );
        builder.push_values(mandate.mandataries.iter(), |mut row, mandatary| {
            row.push_bind(mandate_id)
                .push_bind(*mandatary.party_id.as_uuid())
                .push_bind(mandatary.mandatary_role.clone())
                .push_bind(mandatary.mandatary_type.clone())
                .push_bind(mandatary.period.from)
                .push_bind(mandatary.period.to);
        });
        builder.build().execute(&mut *conn).await?;
    }

    if !mandate.properties.is_empty() {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO mandate_properties (mandate_id, property_type, value) ");
        builder.push_values(mandate.properties.iter(), |mut row, property| {
            row.push_bind(mandate_id)
                .push_bind(property.property_type.clone())
                .push_bind(property.value.clone());
        });
        builder.build().execute(&mut *conn).await?;
    }

    Ok(())
}

async fn load_mandate(conn: &mut PgConnection, row: MandateRow) -> Result<Mandate, DatabaseError> {
    let mandataries = sqlx::query_as::<_, MandataryRow>(
        r#"
        SELECT mandate_id, party_id, mandatary_role, mandatary_type, valid_from, valid_to
        FROM mandataries
        WHERE mandate_id = $1
        ORDER BY party_id, mandatary_role
        "#,
    )
    .bind(row.mandate_id)
    .fetch_all(&mut *conn)
    .await?;

    let properties = sqlx::query_as::<_, MandatePropertyRow>(
        r#"
        SELECT mandate_id, property_type, value
        FROM mandate_properties
        WHERE mandate_id = $1
        ORDER BY property_type
        "#,
    )
    .bind(row.mandate_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut mandate = Mandate::from(row);
    mandate.mandataries = mandataries.into_iter().map(Mandatary::from).collect();
    mandate.properties = properties.into_iter().map(MandateProperty::from).collect();
    Ok(mandate)
}

/// Database row for a mandate root record
#[derive(Debug, Clone, FromRow)]
pub struct MandateRow {
    pub mandate_id: Uuid,
    pub tenant_id: Uuid,
    pub party_id: Uuid,
    pub mandate_type: String,
    pub description: Option<String>,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

impl From<MandateRow> for Mandate {
    fn from(row: MandateRow) -> Self {
        let mut mandate = Mandate::new(
            TenantId::from_uuid(row.tenant_id),
            PartyId::from_uuid(row.party_id),
            row.mandate_type,
        );
        mandate.id = MandateId::from_uuid(row.mandate_id);
        mandate.description = row.description;
        mandate.period = EffectivePeriod {
            from: row.valid_from,
            to: row.valid_to,
        };
        mandate.audit = AuditStamps {
            created_at: row.created_at,
            updated_at: row.updated_at,
            created_by: row.created_by,
            updated_by: row.updated_by,
        };
        mandate
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MandataryRow {
    pub mandate_id: Uuid,
    pub party_id: Uuid,
    pub mandatary_role: String,
    pub mandatary_type: String,
    pub valid_from: Option<NaiveDate>,
    pub valid_to: Option<NaiveDate>,
}

impl From<MandataryRow> for Mandatary {
    fn from(row: MandataryRow) -> Self {
        let mut mandatary = Mandatary::new(
            MandateId::from_uuid(row.mandate_id),
            PartyId::from_uuid(row.party_id),
            row.mandatary_type,
            row.mandatary_role,
        );
        mandatary.period = EffectivePeriod {
            from: row.valid_from,
            to: row.valid_to,
        };
        mandatary
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MandatePropertyRow {
    pub mandate_id: Uuid,
    pub property_type: String,
    pub value: String,
}

impl From<MandatePropertyRow> for MandateProperty {
    fn from(row: MandatePropertyRow) -> Self {
        MandateProperty::new(MandateId::from_uuid(row.mandate_id), row.property_type, row.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_association_row_conversion() {
        let now = Utc::now();
        let from = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let row = AssociationRow {
            association_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            association_type: "EMPLOYS".to_string(),
            from_party_id: Uuid::new_v4(),
            to_party_id: Uuid::new_v4(),
            valid_from: Some(from),
            valid_to: None,
            created_at: now,
            updated_at: now,
            created_by: None,
            updated_by: None,
        };
        let association = Association::from(row.clone());

        assert_eq!(*association.id.as_uuid(), row.association_id);
        assert_eq!(*association.from_party_id.as_uuid(), row.from_party_id);
        assert!(association.period.contains(from));
        assert!(association.period.is_open_ended());
    }

    #[test]
    fn test_mandate_row_conversion() {
        let now = Utc::now();
        let mandate_id = Uuid::new_v4();
        let row = MandateRow {
            mandate_id,
            tenant_id: Uuid::new_v4(),
            party_id: Uuid::new_v4(),
            mandate_type: "POWER_OF_ATTORNEY".to_string(),
            description: Some("General".to_string()),
            valid_from: None,
            valid_to: None,
            created_at: now,
            updated_at: now,
            created_by: Some("clerk".to_string()),
            updated_by: Some("clerk".to_string()),
        };
        let mandate = Mandate::from(row);

        assert_eq!(*mandate.id.as_uuid(), mandate_id);
        assert_eq!(mandate.description.as_deref(), Some("General"));
        assert!(mandate.mandataries.is_empty());
        assert_eq!(mandate.audit.created_by.as_deref(), Some("clerk"));
    }

    #[test]
    fn test_mandatary_row_keeps_role_and_type_apart() {
        let row = MandataryRow {
            mandate_id: Uuid::new_v4(),
            party_id: Uuid::new_v4(),
            mandatary_role: "SIGNATORY".to_string(),
            mandatary_type: "INDIVIDUAL".to_string(),
            valid_from: None,
            valid_to: None,
        };
        let mandatary = Mandatary::from(row);
        assert_eq!(mandatary.mandatary_role, "SIGNATORY");
        assert_eq!(mandatary.mandatary_type, "INDIVIDUAL");
    }
}
