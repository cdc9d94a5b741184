//! Reference-data repository
//!
//! All catalogs share one table keyed by (tenant, catalog, locale, code).
//! The full row is kept as tagged JSON; `sort_index` and `party_types` are
//! copied into their own columns for ordering and ad-hoc queries.

use sqlx::types::Json;
use sqlx::PgPool;
use unic_langid::LanguageIdentifier;

use core_kernel::TenantId;
use domain_party::reference::{CatalogKind, ReferenceData, ReferenceItem};

use crate::error::DatabaseError;

/// Repository for catalog rows
#[derive(Debug, Clone)]
pub struct ReferenceRepository {
    pool: PgPool,
}

impl ReferenceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists one catalog ordered by sort index, code and locale
    pub async fn list(
        &self,
        tenant_id: TenantId,
        kind: CatalogKind,
        locale: Option<&LanguageIdentifier>,
    ) -> Result<Vec<ReferenceItem>, DatabaseError> {
        let rows = sqlx::query_scalar::<_, Json<ReferenceItem>>(
            r#"
            SELECT payload FROM reference_data
            WHERE tenant_id = $1 AND catalog = $2 AND ($3::text IS NULL OR locale = $3)
            ORDER BY sort_index, code, locale
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(kind.name())
        .bind(locale.map(LanguageIdentifier::to_string))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|Json(item)| item).collect())
    }

    /// Lists every catalog row of a tenant
    pub async fn list_all(&self, tenant_id: TenantId) -> Result<Vec<ReferenceItem>, DatabaseError> {
        let rows = sqlx::query_scalar::<_, Json<ReferenceItem>>(
            r#"
            SELECT payload FROM reference_data
            WHERE tenant_id = $1
            ORDER BY catalog, sort_index, code
            "#,
        )
        .bind(tenant_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|Json(item)| item).collect())
    }

    /// Inserts a row or replaces the row with the same key
    pub async fn upsert(&self, item: &ReferenceItem) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO reference_data (tenant_id, catalog, locale, code, sort_index, party_types, payload)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (tenant_id, catalog, locale, code) DO UPDATE
            SET sort_index = EXCLUDED.sort_index,
                party_types = EXCLUDED.party_types,
                payload = EXCLUDED.payload
            "#,
        )
        .bind(item.tenant_id().as_uuid())
        .bind(item.kind().name())
        .bind(item.locale().to_string())
        .bind(item.code())
        .bind(item.sort_index())
        .bind(item.party_type_filter().and_then(|filter| filter.as_stored()))
        .bind(Json(item))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes one row
    ///
    /// # Returns
    ///
    /// `DatabaseError::NotFound` if no row has the key
    pub async fn delete(
        &self,
        tenant_id: TenantId,
        kind: CatalogKind,
        locale: &LanguageIdentifier,
        code: &str,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            DELETE FROM reference_data
            WHERE tenant_id = $1 AND catalog = $2 AND locale = $3 AND code = $4
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(kind.name())
        .bind(locale.to_string())
        .bind(code)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found(kind.name(), code));
        }
        Ok(())
    }
}
