//! Associations between parties
//!
//! An association is a typed, directed, time-bound relationship from one
//! party to another ("employs", "is subsidiary of", "is spouse of"). Only
//! one association of a given type may link the same two parties in the
//! same direction.

use serde::{Deserialize, Serialize};

use core_kernel::{AssociationId, AuditStamps, EffectivePeriod, PartyId, TenantId};

/// A relationship between two parties of the same tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub id: AssociationId,
    pub tenant_id: TenantId,
    /// Code of an `AssociationType` row
    pub association_type: String,
    pub from_party_id: PartyId,
    pub to_party_id: PartyId,
    #[serde(default)]
    pub period: EffectivePeriod,
    #[serde(default)]
    pub audit: AuditStamps,
}

impl Association {
    pub fn new(
        tenant_id: TenantId,
        association_type: impl Into<String>,
        from_party_id: PartyId,
        to_party_id: PartyId,
    ) -> Self {
        Self {
            id: AssociationId::new_v7(),
            tenant_id,
            association_type: association_type.into(),
            from_party_id,
            to_party_id,
            period: EffectivePeriod::open(),
            audit: AuditStamps::default(),
        }
    }

    pub fn with_period(mut self, period: EffectivePeriod) -> Self {
        self.period = period;
        self
    }

    /// The uniqueness key: type plus both ends, in direction order
    pub fn natural_key(&self) -> (&str, PartyId, PartyId) {
        (&self.association_type, self.from_party_id, self.to_party_id)
    }

    /// Returns true if `party_id` is either end of the association
    pub fn involves(&self, party_id: PartyId) -> bool {
        self.from_party_id == party_id || self.to_party_id == party_id
    }

    /// Returns the other end of the association as seen from `party_id`
    pub fn counterparty(&self, party_id: PartyId) -> Option<PartyId> {
        if self.from_party_id == party_id {
            Some(self.to_party_id)
        } else if self.to_party_id == party_id {
            Some(self.from_party_id)
        } else {
            None
        }
    }
}
