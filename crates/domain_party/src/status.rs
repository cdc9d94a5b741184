//! Time-bound classifications of a party: locks, roles, statuses and
//! segments

use serde::{Deserialize, Serialize};

use core_kernel::{EffectivePeriod, PartyId};

use crate::child::{impl_party_child, impl_time_bound};

/// Blocks a party from use while effective
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lock {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of a `LockType` row
    pub lock_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl Lock {
    pub fn new(party_id: PartyId, lock_type: impl Into<String>, period: EffectivePeriod) -> Self {
        Self {
            party_id,
            lock_type: lock_type.into(),
            reason: None,
            period,
        }
    }
}

/// A role a party plays (customer, supplier, employee, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRole {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of a `RoleType` row
    pub role_type: String,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl PartyRole {
    pub fn new(party_id: PartyId, role_type: impl Into<String>) -> Self {
        Self {
            party_id,
            role_type: role_type.into(),
            period: EffectivePeriod::open(),
        }
    }
}

/// A lifecycle status of a party
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of a `StatusType` row
    pub status_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl Status {
    pub fn new(party_id: PartyId, status_type: impl Into<String>, period: EffectivePeriod) -> Self {
        Self {
            party_id,
            status_type: status_type.into(),
            reason: None,
            period,
        }
    }
}

/// Membership of a commercial segment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySegment {
    #[serde(default)]
    pub party_id: PartyId,
    /// Code of a `Segment` row
    pub segment: String,
    #[serde(default)]
    pub period: EffectivePeriod,
}

impl PartySegment {
    pub fn new(party_id: PartyId, segment: impl Into<String>) -> Self {
        Self {
            party_id,
            segment: segment.into(),
            period: EffectivePeriod::open(),
        }
    }
}

impl_party_child!(Lock { lock_type: String });
impl_party_child!(PartyRole { role_type: String });
impl_party_child!(Status { status_type: String });
impl_party_child!(PartySegment { segment: String });
impl_time_bound!(Lock, PartyRole, Status, PartySegment);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::child::{ChildSet, TimeBound};
    use chrono::NaiveDate;

    #[test]
    fn test_lock_effective_window() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let lock = Lock::new(PartyId::new(), "FRAUD", EffectivePeriod::between(start, end).unwrap());

        assert!(lock.is_effective_on(start));
        assert!(lock.is_effective_on(end));
        assert!(!lock.is_effective_on(end.succ_opt().unwrap()));
    }

    #[test]
    fn test_status_set_replaces_same_type() {
        let party = PartyId::new();
        let mut statuses = ChildSet::new();
        statuses.upsert(Status::new(party, "ACTIVE", EffectivePeriod::open()));
        let mut revised = Status::new(party, "ACTIVE", EffectivePeriod::open());
        revised.reason = Some("re-onboarded".into());
        statuses.upsert(revised);

        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses.iter().next().unwrap().reason.as_deref(), Some("re-onboarded"));
    }
}
