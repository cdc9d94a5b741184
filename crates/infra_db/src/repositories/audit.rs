//! Append-only snapshot and history repository

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use core_kernel::{HistoryId, PageRequest, PartyId, SnapshotId, TenantId};
use domain_party::{ChangeKind, PartyAudit, PartyHistory, PartySnapshot};

use crate::error::DatabaseError;

/// Repository for party snapshots and change history
///
/// Rows are only ever inserted. They carry no foreign key to `parties`, so
/// the trail of a deleted party remains readable.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists snapshots newest first, optionally for one party
    pub async fn find_snapshots(
        &self,
        tenant_id: TenantId,
        party_id: Option<PartyId>,
        page: &PageRequest,
    ) -> Result<(Vec<PartySnapshot>, u64), DatabaseError> {
        let party_uuid = party_id.map(|id| *id.as_uuid());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM party_snapshots
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR party_id = $2)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(party_uuid)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT snapshot_id, tenant_id, party_id, taken_at, payload
            FROM party_snapshots
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR party_id = $2)
            ORDER BY taken_at DESC, snapshot_id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(party_uuid)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await?;

        Ok((
            rows.into_iter().map(PartySnapshot::from).collect(),
            u64::try_from(total).unwrap_or(0),
        ))
    }

    /// Lists a party's change log, oldest first
    pub async fn find_history(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
    ) -> Result<Vec<PartyHistory>, DatabaseError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT history_id, tenant_id, party_id, change_kind, changed_at,
                   changed_by, correlation_id, payload
            FROM party_history
            WHERE tenant_id = $1 AND party_id = $2
            ORDER BY changed_at, history_id
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(party_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PartyHistory::try_from).collect()
    }
}

/// Writes the audit rows of a party write on `conn`
///
/// Called inside the transaction that writes the party, so both commit or
/// roll back together.
pub async fn insert_audit(conn: &mut PgConnection, audit: &PartyAudit) -> Result<(), DatabaseError> {
    if let Some(snapshot) = &audit.snapshot {
        insert_snapshot(conn, snapshot).await?;
    }
    insert_history(conn, &audit.history).await
}

pub async fn insert_snapshot(conn: &mut PgConnection, snapshot: &PartySnapshot) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO party_snapshots (snapshot_id, tenant_id, party_id, taken_at, payload)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(snapshot.id.as_uuid())
    .bind(snapshot.tenant_id.as_uuid())
    .bind(snapshot.party_id.as_uuid())
    .bind(snapshot.taken_at)
    .bind(&snapshot.payload)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

pub async fn insert_history(conn: &mut PgConnection, history: &PartyHistory) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO party_history (
            history_id, tenant_id, party_id, change_kind, changed_at,
            changed_by, correlation_id, payload
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(history.id.as_uuid())
    .bind(history.tenant_id.as_uuid())
    .bind(history.party_id.as_uuid())
    .bind(history.change.code())
    .bind(history.changed_at)
    .bind(history.changed_by.as_deref())
    .bind(history.correlation_id.as_deref())
    .bind(&history.payload)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

#[derive(Debug, Clone, FromRow)]
pub struct SnapshotRow {
    pub snapshot_id: Uuid,
    pub tenant_id: Uuid,
    pub party_id: Uuid,
    pub taken_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl From<SnapshotRow> for PartySnapshot {
    fn from(row: SnapshotRow) -> Self {
        PartySnapshot {
            id: SnapshotId::from_uuid(row.snapshot_id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            party_id: PartyId::from_uuid(row.party_id),
            taken_at: row.taken_at,
            payload: row.payload,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct HistoryRow {
    pub history_id: Uuid,
    pub tenant_id: Uuid,
    pub party_id: Uuid,
    pub change_kind: String,
    pub changed_at: DateTime<Utc>,
    pub changed_by: Option<String>,
    pub correlation_id: Option<String>,
    pub payload: serde_json::Value,
}

impl TryFrom<HistoryRow> for PartyHistory {
    type Error = DatabaseError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let change = ChangeKind::from_code(&row.change_kind).ok_or_else(|| {
            DatabaseError::SerializationError(format!("unknown change kind '{}'", row.change_kind))
        })?;

        Ok(PartyHistory {
            id: HistoryId::from_uuid(row.history_id),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            party_id: PartyId::from_uuid(row.party_id),
            change,
            changed_at: row.changed_at,
            changed_by: row.changed_by,
            correlation_id: row.correlation_id,
            payload: row.payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_row(change_kind: &str) -> HistoryRow {
        HistoryRow {
            history_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            party_id: Uuid::new_v4(),
            change_kind: change_kind.to_string(),
            changed_at: Utc::now(),
            changed_by: Some("clerk".to_string()),
            correlation_id: Some("req-1".to_string()),
            payload: serde_json::json!({}),
        }
    }

    #[test]
    fn test_history_row_conversion() {
        let history = PartyHistory::try_from(history_row("UPDATED")).unwrap();
        assert_eq!(history.change, ChangeKind::Updated);
        assert_eq!(history.correlation_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_unknown_change_kind_is_rejected() {
        let error = PartyHistory::try_from(history_row("ARCHIVED")).unwrap_err();
        assert!(matches!(error, DatabaseError::SerializationError(_)));
    }
}
