//! Paginated result envelopes returned by list operations

use serde::{Deserialize, Serialize};

use core_kernel::{Page, PartyId};

use crate::association::Association;
use crate::party::{Party, PartySummary};
use crate::snapshot::PartySnapshot;

/// A page of party root records of either type
pub type Parties = Page<PartySummary>;

/// A page of person parties with their child facts
pub type Persons = Page<Party>;

/// A page of organization parties with their child facts
pub type Organizations = Page<Party>;

/// A page of snapshots across parties
pub type Snapshots = Page<PartySnapshot>;

/// The associations one party takes part in, from either end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationsForParty {
    pub party_id: PartyId,
    pub associations: Page<Association>,
}

impl AssociationsForParty {
    /// Returns the parties on the other end of the listed associations
    pub fn counterparties(&self) -> Vec<PartyId> {
        self.associations
            .items
            .iter()
            .filter_map(|association| association.counterparty(self.party_id))
            .collect()
    }
}

/// The snapshots of one party, newest first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySnapshots {
    pub party_id: PartyId,
    pub snapshots: Page<PartySnapshot>,
}

impl PartySnapshots {
    pub fn latest(&self) -> Option<&PartySnapshot> {
        self.snapshots.items.first()
    }
}
