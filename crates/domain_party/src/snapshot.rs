//! Append-only audit rows
//!
//! Every write to a party produces a `PartySnapshot` holding the full JSON
//! image of the party after the write, and a `PartyHistory` row recording
//! what kind of change happened and who made it. Neither is ever updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{HistoryId, PartyId, SnapshotId, TenantId};

use crate::party::Party;

/// The full JSON image of a party at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySnapshot {
    pub id: SnapshotId,
    pub tenant_id: TenantId,
    pub party_id: PartyId,
    pub taken_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl PartySnapshot {
    /// Captures the current state of `party`
    pub fn of(party: &Party) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: SnapshotId::new_v7(),
            tenant_id: party.tenant_id,
            party_id: party.id,
            taken_at: Utc::now(),
            payload: serde_json::to_value(party)?,
        })
    }

    /// Rebuilds the party from the captured image
    pub fn restore(&self) -> Result<Party, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}

/// The kind of write a history row records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn code(&self) -> &'static str {
        match self {
            ChangeKind::Created => "CREATED",
            ChangeKind::Updated => "UPDATED",
            ChangeKind::Deleted => "DELETED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CREATED" => Some(ChangeKind::Created),
            "UPDATED" => Some(ChangeKind::Updated),
            "DELETED" => Some(ChangeKind::Deleted),
            _ => None,
        }
    }
}

/// One entry in a party's change log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyHistory {
    pub id: HistoryId,
    pub tenant_id: TenantId,
    pub party_id: PartyId,
    pub change: ChangeKind,
    pub changed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub payload: serde_json::Value,
}

impl PartyHistory {
    pub fn record(
        party: &Party,
        change: ChangeKind,
        changed_by: Option<&str>,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: HistoryId::new_v7(),
            tenant_id: party.tenant_id,
            party_id: party.id,
            change,
            changed_at: Utc::now(),
            changed_by: changed_by.map(str::to_string),
            correlation_id: None,
            payload: serde_json::to_value(party)?,
        })
    }

    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id;
        self
    }
}

/// The audit rows that go with one party write
///
/// Stores persist these in the same operation as the party itself, so a
/// write never lands without its trail.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyAudit {
    pub snapshot: Option<PartySnapshot>,
    pub history: PartyHistory,
}

impl PartyAudit {
    /// Builds the rows for `change`; deletions carry no snapshot
    pub fn record(
        party: &Party,
        change: ChangeKind,
        changed_by: Option<&str>,
        correlation_id: Option<String>,
    ) -> Result<Self, serde_json::Error> {
        let snapshot = match change {
            ChangeKind::Deleted => None,
            ChangeKind::Created | ChangeKind::Updated => Some(PartySnapshot::of(party)?),
        };
        let history = PartyHistory::record(party, change, changed_by)?.with_correlation_id(correlation_id);
        Ok(Self { snapshot, history })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::party::{Organization, Party};

    #[test]
    fn test_snapshot_restores_party() {
        let party = Party::new_organization(TenantId::new(), Organization::new("Acme"));
        let snapshot = PartySnapshot::of(&party).unwrap();
        assert_eq!(snapshot.party_id, party.id);
        assert_eq!(snapshot.tenant_id, party.tenant_id);

        let restored = snapshot.restore().unwrap();
        assert_eq!(restored.display_name(), "Acme");
    }

    #[test]
    fn test_history_row() {
        let party = Party::new_organization(TenantId::new(), Organization::new("Acme"));
        let row = PartyHistory::record(&party, ChangeKind::Deleted, Some("auditor")).unwrap();
        assert_eq!(row.change, ChangeKind::Deleted);
        assert_eq!(row.changed_by.as_deref(), Some("auditor"));
        assert_eq!(ChangeKind::from_code(row.change.code()), Some(ChangeKind::Deleted));
    }

    #[test]
    fn test_audit_for_deletion_has_no_snapshot() {
        let party = Party::new_organization(TenantId::new(), Organization::new("Acme"));
        let created = PartyAudit::record(&party, ChangeKind::Created, None, Some("req-7".into())).unwrap();
        assert!(created.snapshot.is_some());
        assert_eq!(created.history.correlation_id.as_deref(), Some("req-7"));

        let deleted = PartyAudit::record(&party, ChangeKind::Deleted, Some("clerk"), None).unwrap();
        assert!(deleted.snapshot.is_none());
        assert_eq!(deleted.history.change, ChangeKind::Deleted);
    }
}
