//! Party Domain Ports
//!
//! This module defines the storage ports of the party domain, so the service
//! can run over different backends (PostgreSQL, in-memory, ...).
//!
//! # Architecture
//!
//! Two traits describe what the domain needs from storage:
//!
//! - `PartyDataStore`: parties with their child facts, associations,
//!   mandates, and the append-only snapshot/history rows
//! - `ReferenceDataStore`: tenant- and locale-scoped catalog rows
//!
//! Adapters implementing them:
//!
//! - **PostgreSQL**: `infra_db::PostgresPartyStore`
//! - **In-memory**: `mock::InMemoryPartyStore`, for tests and local runs
//!
//! Every read is scoped by tenant: a record of another tenant is reported as
//! `PortError::NotFound`, never returned.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_party::ports::{PartyDataStore, ReferenceDataStore};
//! use std::sync::Arc;
//!
//! let store = Arc::new(InMemoryPartyStore::new());
//! let service = PartyService::new(store.clone(), store);
//! ```

use std::cmp::Ordering;

use async_trait::async_trait;
use unic_langid::LanguageIdentifier;

use core_kernel::{
    AssociationId, DomainPort, HealthCheckable, MandateId, OperationMetadata, Page, PageRequest,
    PartyId, PortError, SortDirection, SortOrder, TenantId,
};

use crate::association::Association;
use crate::mandate::Mandate;
use crate::party::{Party, PartyType};
use crate::reference::{CatalogKind, ReferenceItem};
use crate::snapshot::{PartyAudit, PartyHistory, PartySnapshot};

/// Query parameters for finding parties
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyQuery {
    /// Filter by party type
    pub party_type: Option<PartyType>,
    /// Case-insensitive substring of the display name
    pub name_contains: Option<String>,
    /// Filter by an external reference `(reference type, value)`
    pub external_reference: Option<(String, String)>,
    /// Filter by segment membership
    pub segment: Option<String>,
}

impl PartyQuery {
    /// Creates a query for one party type
    pub fn by_type(party_type: PartyType) -> Self {
        Self {
            party_type: Some(party_type),
            ..Default::default()
        }
    }

    /// Creates a query to find by display name fragment
    pub fn by_name(fragment: impl Into<String>) -> Self {
        Self {
            name_contains: Some(fragment.into()),
            ..Default::default()
        }
    }

    /// Creates a query to find by external reference
    pub fn by_external_reference(reference_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            external_reference: Some((reference_type.into(), value.into())),
            ..Default::default()
        }
    }

    /// Restricts the query to one party type
    pub fn of_type(mut self, party_type: PartyType) -> Self {
        self.party_type = Some(party_type);
        self
    }

    /// Restricts the query to members of a segment
    pub fn in_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    /// Returns true if `party` satisfies every filter that is set
    pub fn matches(&self, party: &Party) -> bool {
        if let Some(party_type) = self.party_type {
            if party.party_type() != party_type {
                return false;
            }
        }
        if let Some(fragment) = &self.name_contains {
            let fragment = fragment.to_lowercase();
            let legal_name_matches = party
                .organization()
                .and_then(|o| o.legal_name.as_ref())
                .map_or(false, |n| n.to_lowercase().contains(&fragment));
            if !party.display_name().to_lowercase().contains(&fragment) && !legal_name_matches {
                return false;
            }
        }
        if let Some((reference_type, value)) = &self.external_reference {
            if party.external_reference(reference_type) != Some(value.as_str()) {
                return false;
            }
        }
        if let Some(segment) = &self.segment {
            if !party.in_segment(segment) {
                return false;
            }
        }
        true
    }
}

/// Orders parties by the requested sort fields, then by creation time
///
/// Known fields: `displayName`, `createdAt`, `updatedAt`, `partyType`.
pub fn compare_parties(a: &Party, b: &Party, sort: &[SortOrder]) -> Ordering {
    for order in sort {
        let ordering = match order.field.as_str() {
            "displayName" | "name" => a.display_name().to_lowercase().cmp(&b.display_name().to_lowercase()),
            "createdAt" => a.audit.created_at.cmp(&b.audit.created_at),
            "updatedAt" => a.audit.updated_at.cmp(&b.audit.updated_at),
            "partyType" => a.party_type().code().cmp(b.party_type().code()),
            _ => Ordering::Equal,
        };
        let ordering = match order.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.audit
        .created_at
        .cmp(&b.audit.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Storage port for parties, associations, mandates and audit rows
///
/// All methods are async and return `Result<T, PortError>` for consistent
/// error handling across adapters.
#[async_trait]
pub trait PartyDataStore: DomainPort + HealthCheckable {
    // ========================================================================
    // Parties
    // ========================================================================

    /// Stores a new party with all of its child facts and its audit rows
    ///
    /// The party and `audit` are written atomically: on failure neither is
    /// stored.
    ///
    /// # Returns
    ///
    /// The stored party, or `PortError::Duplicate` if the ID is taken
    async fn insert_party(
        &self,
        party: Party,
        audit: PartyAudit,
        metadata: Option<OperationMetadata>,
    ) -> Result<Party, PortError>;

    /// Retrieves a party by ID within a tenant
    ///
    /// # Returns
    ///
    /// The party if found, or `PortError::NotFound`
    async fn get_party(
        &self,
        tenant_id: TenantId,
        id: PartyId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Party, PortError>;

    /// Replaces a stored party, child sets included, and appends its audit
    /// rows in the same operation
    async fn update_party(
        &self,
        party: Party,
        audit: PartyAudit,
        metadata: Option<OperationMetadata>,
    ) -> Result<Party, PortError>;

    /// Deletes a party together with its associations and mandates, and
    /// appends its audit rows in the same operation
    async fn delete_party(
        &self,
        tenant_id: TenantId,
        id: PartyId,
        audit: PartyAudit,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Finds parties matching the query, one page at a time
    async fn find_parties(
        &self,
        tenant_id: TenantId,
        query: &PartyQuery,
        page: &PageRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Page<Party>, PortError>;

    /// Checks if a party exists within a tenant
    async fn party_exists(
        &self,
        tenant_id: TenantId,
        id: PartyId,
        metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError>;

    // ========================================================================
    // Associations
    // ========================================================================

    /// Stores a new association
    ///
    /// Fails with `PortError::Duplicate` if the ID or the natural key
    /// (type, from party, to party) is already taken.
    async fn insert_association(
        &self,
        association: Association,
        metadata: Option<OperationMetadata>,
    ) -> Result<Association, PortError>;

    async fn get_association(
        &self,
        tenant_id: TenantId,
        id: AssociationId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Association, PortError>;

    async fn update_association(
        &self,
        association: Association,
        metadata: Option<OperationMetadata>,
    ) -> Result<Association, PortError>;

    async fn delete_association(
        &self,
        tenant_id: TenantId,
        id: AssociationId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Lists the associations a party takes part in, from either end
    async fn find_associations(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: &PageRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Page<Association>, PortError>;

    // ========================================================================
    // Mandates
    // ========================================================================

    async fn insert_mandate(
        &self,
        mandate: Mandate,
        metadata: Option<OperationMetadata>,
    ) -> Result<Mandate, PortError>;

    async fn get_mandate(
        &self,
        tenant_id: TenantId,
        id: MandateId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Mandate, PortError>;

    async fn update_mandate(
        &self,
        mandate: Mandate,
        metadata: Option<OperationMetadata>,
    ) -> Result<Mandate, PortError>;

    async fn delete_mandate(
        &self,
        tenant_id: TenantId,
        id: MandateId,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Lists the mandates granted by a party
    async fn find_mandates(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: &PageRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Page<Mandate>, PortError>;

    // ========================================================================
    // Audit rows
    // ========================================================================

    /// Lists snapshots newest first, optionally for one party only
    async fn find_snapshots(
        &self,
        tenant_id: TenantId,
        party_id: Option<PartyId>,
        page: &PageRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<Page<PartySnapshot>, PortError>;

    /// Lists a party's change log, oldest first
    async fn find_history(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<PartyHistory>, PortError>;
}

/// Storage port for reference catalogs
#[async_trait]
pub trait ReferenceDataStore: DomainPort {
    /// Lists one catalog, ordered by sort index then code
    ///
    /// With `locale` set only rows of that locale are returned.
    async fn list_catalog(
        &self,
        tenant_id: TenantId,
        kind: CatalogKind,
        locale: Option<&LanguageIdentifier>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<ReferenceItem>, PortError>;

    /// Lists every catalog row of a tenant
    async fn list_all(
        &self,
        tenant_id: TenantId,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<ReferenceItem>, PortError>;

    /// Inserts or replaces a row keyed by (tenant, catalog, locale, code)
    async fn put_item(
        &self,
        item: ReferenceItem,
        metadata: Option<OperationMetadata>,
    ) -> Result<ReferenceItem, PortError>;

    async fn delete_item(
        &self,
        tenant_id: TenantId,
        kind: CatalogKind,
        locale: &LanguageIdentifier,
        code: &str,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;
}

/// In-memory implementation of the storage ports
///
/// This adapter keeps everything in memory and is useful for unit testing
/// and for running the API without a database. It enforces the same
/// not-found, duplicate and cascade rules as the PostgreSQL adapter.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
    use std::sync::Arc;

    use chrono::Utc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    use crate::reference::ReferenceData;

    type ReferenceKey = (TenantId, CatalogKind, LanguageIdentifier, String);

    /// In-memory party and reference-data store
    #[derive(Debug)]
    pub struct InMemoryPartyStore {
        parties: Arc<RwLock<HashMap<PartyId, Party>>>,
        associations: Arc<RwLock<HashMap<AssociationId, Association>>>,
        mandates: Arc<RwLock<HashMap<MandateId, Mandate>>>,
        snapshots: Arc<RwLock<Vec<PartySnapshot>>>,
        history: Arc<RwLock<Vec<PartyHistory>>>,
        reference: Arc<RwLock<HashMap<ReferenceKey, ReferenceItem>>>,
        available: AtomicBool,
        audit_failing: AtomicBool,
    }

    impl Default for InMemoryPartyStore {
        fn default() -> Self {
            Self {
                parties: Arc::default(),
                associations: Arc::default(),
                mandates: Arc::default(),
                snapshots: Arc::default(),
                history: Arc::default(),
                reference: Arc::default(),
                available: AtomicBool::new(true),
                audit_failing: AtomicBool::new(false),
            }
        }
    }

    impl InMemoryPartyStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with parties for testing
        pub async fn with_parties(parties: Vec<Party>) -> Self {
            let store = Self::new();
            {
                let mut map = store.parties.write().await;
                for party in parties {
                    map.insert(party.id, party);
                }
            }
            store
        }

        /// Simulates an outage: while unavailable every call fails with
        /// `PortError::ServiceUnavailable`
        pub fn set_available(&self, available: bool) {
            self.available.store(available, AtomicOrdering::SeqCst);
        }

        fn ensure_available(&self) -> Result<(), PortError> {
            if self.available.load(AtomicOrdering::SeqCst) {
                Ok(())
            } else {
                Err(PortError::unavailable("in-memory-party-store"))
            }
        }

        /// Makes every audit write fail with `PortError::ServiceUnavailable`,
        /// rolling back the party write it belongs to
        pub fn set_audit_failing(&self, failing: bool) {
            self.audit_failing.store(failing, AtomicOrdering::SeqCst);
        }

        fn ensure_audit_writable(&self) -> Result<(), PortError> {
            if self.audit_failing.load(AtomicOrdering::SeqCst) {
                Err(PortError::unavailable("in-memory-audit-log"))
            } else {
                Ok(())
            }
        }

        /// Appends the audit rows of a party write
        ///
        /// Callers hold the `parties` write lock, so the party change and
        /// its rows become visible together.
        async fn append_audit(&self, audit: PartyAudit) {
            if let Some(snapshot) = audit.snapshot {
                self.snapshots.write().await.push(snapshot);
            }
            self.history.write().await.push(audit.history);
        }
    }

    impl DomainPort for InMemoryPartyStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryPartyStore {
        async fn health_check(&self) -> HealthCheckResult {
            let available = self.ensure_available().is_ok();
            HealthCheckResult {
                adapter_id: "in-memory-party-store".to_string(),
                status: if available { AdapterHealth::Healthy } else { AdapterHealth::Unhealthy },
                latency_ms: 0,
                message: (!available).then(|| "Store marked unavailable".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl PartyDataStore for InMemoryPartyStore {
        async fn insert_party(
            &self,
            party: Party,
            audit: PartyAudit,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Party, PortError> {
            self.ensure_available()?;
            let mut parties = self.parties.write().await;
            if parties.contains_key(&party.id) {
                return Err(PortError::duplicate("Party", party.id));
            }
            self.ensure_audit_writable()?;
            parties.insert(party.id, party.clone());
            self.append_audit(audit).await;
            Ok(party)
        }

        async fn get_party(
            &self,
            tenant_id: TenantId,
            id: PartyId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Party, PortError> {
            self.ensure_available()?;
            self.parties
                .read()
                .await
                .get(&id)
                .filter(|p| p.tenant_id == tenant_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Party", id))
        }

        async fn update_party(
            &self,
            party: Party,
            audit: PartyAudit,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Party, PortError> {
            self.ensure_available()?;
            let mut parties = self.parties.write().await;
            let existing = parties
                .get_mut(&party.id)
                .filter(|p| p.tenant_id == party.tenant_id)
                .ok_or_else(|| PortError::not_found("Party", party.id))?;
            self.ensure_audit_writable()?;
            *existing = party.clone();
            self.append_audit(audit).await;
            Ok(party)
        }

        async fn delete_party(
            &self,
            tenant_id: TenantId,
            id: PartyId,
            audit: PartyAudit,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.ensure_available()?;
            let mut parties = self.parties.write().await;
            match parties.get(&id) {
                Some(party) if party.tenant_id == tenant_id => {}
                _ => return Err(PortError::not_found("Party", id)),
            }
            self.ensure_audit_writable()?;
            parties.remove(&id);
            self.append_audit(audit).await;

            self.associations.write().await.retain(|_, a| !a.involves(id));

            let mut mandates = self.mandates.write().await;
            mandates.retain(|_, m| m.party_id != id);
            for mandate in mandates.values_mut() {
                let keys: Vec<_> = mandate
                    .mandataries
                    .iter()
                    .filter(|m| m.party_id == id)
                    .map(crate::child::ChildEntity::key)
                    .collect();
                for key in keys {
                    mandate.mandataries.remove(&key);
                }
            }
            Ok(())
        }

        async fn find_parties(
            &self,
            tenant_id: TenantId,
            query: &PartyQuery,
            page: &PageRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Page<Party>, PortError> {
            self.ensure_available()?;
            let parties = self.parties.read().await;
            let mut results: Vec<Party> = parties
                .values()
                .filter(|p| p.tenant_id == tenant_id && query.matches(p))
                .cloned()
                .collect();
            results.sort_by(|a, b| compare_parties(a, b, &page.sort));
            Ok(Page::from_vec(results, page))
        }

        async fn party_exists(
            &self,
            tenant_id: TenantId,
            id: PartyId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<bool, PortError> {
            self.ensure_available()?;
            Ok(self
                .parties
                .read()
                .await
                .get(&id)
                .map_or(false, |p| p.tenant_id == tenant_id))
        }

        async fn insert_association(
            &self,
            association: Association,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Association, PortError> {
            self.ensure_available()?;
            let mut associations = self.associations.write().await;
            if associations.contains_key(&association.id) {
                return Err(PortError::duplicate("Association", association.id));
            }
            if associations.values().any(|a| {
                a.tenant_id == association.tenant_id && a.natural_key() == association.natural_key()
            }) {
                return Err(PortError::duplicate("Association", association.id));
            }
            associations.insert(association.id, association.clone());
            Ok(association)
        }

        async fn get_association(
            &self,
            tenant_id: TenantId,
            id: AssociationId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Association, PortError> {
            self.ensure_available()?;
            self.associations
                .read()
                .await
                .get(&id)
                .filter(|a| a.tenant_id == tenant_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Association", id))
        }

        async fn update_association(
            &self,
            association: Association,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Association, PortError> {
            self.ensure_available()?;
            let mut associations = self.associations.write().await;
            if !associations
                .get(&association.id)
                .map_or(false, |a| a.tenant_id == association.tenant_id)
            {
                return Err(PortError::not_found("Association", association.id));
            }
            if associations.values().any(|a| {
                a.id != association.id
                    && a.tenant_id == association.tenant_id
                    && a.natural_key() == association.natural_key()
            }) {
                return Err(PortError::duplicate("Association", association.id));
            }
            associations.insert(association.id, association.clone());
            Ok(association)
        }

        async fn delete_association(
            &self,
            tenant_id: TenantId,
            id: AssociationId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.ensure_available()?;
            let mut associations = self.associations.write().await;
            match associations.get(&id) {
                Some(a) if a.tenant_id == tenant_id => {
                    associations.remove(&id);
                    Ok(())
                }
                _ => Err(PortError::not_found("Association", id)),
            }
        }

        async fn find_associations(
            &self,
            tenant_id: TenantId,
            party_id: PartyId,
            page: &PageRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Page<Association>, PortError> {
            self.ensure_available()?;
            let associations = self.associations.read().await;
            let mut results: Vec<Association> = associations
                .values()
                .filter(|a| a.tenant_id == tenant_id && a.involves(party_id))
                .cloned()
                .collect();
            results.sort_by(|a, b| {
                a.association_type
                    .cmp(&b.association_type)
                    .then_with(|| a.id.cmp(&b.id))
            });
            Ok(Page::from_vec(results, page))
        }

        async fn insert_mandate(
            &self,
            mandate: Mandate,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Mandate, PortError> {
            self.ensure_available()?;
            let mut mandates = self.mandates.write().await;
            if mandates.contains_key(&mandate.id) {
                return Err(PortError::duplicate("Mandate", mandate.id));
            }
            mandates.insert(mandate.id, mandate.clone());
            Ok(mandate)
        }

        async fn get_mandate(
            &self,
            tenant_id: TenantId,
            id: MandateId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Mandate, PortError> {
            self.ensure_available()?;
            self.mandates
                .read()
                .await
                .get(&id)
                .filter(|m| m.tenant_id == tenant_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Mandate", id))
        }

        async fn update_mandate(
            &self,
            mandate: Mandate,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Mandate, PortError> {
            self.ensure_available()?;
            let mut mandates = self.mandates.write().await;
            let existing = mandates
                .get_mut(&mandate.id)
                .filter(|m| m.tenant_id == mandate.tenant_id)
                .ok_or_else(|| PortError::not_found("Mandate", mandate.id))?;
            *existing = mandate.clone();
            Ok(mandate)
        }

        async fn delete_mandate(
            &self,
            tenant_id: TenantId,
            id: MandateId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.ensure_available()?;
            let mut mandates = self.mandates.write().await;
            match mandates.get(&id) {
                Some(m) if m.tenant_id == tenant_id => {
                    mandates.remove(&id);
                    Ok(())
                }
                _ => Err(PortError::not_found("Mandate", id)),
            }
        }

        async fn find_mandates(
            &self,
            tenant_id: TenantId,
            party_id: PartyId,
            page: &PageRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Page<Mandate>, PortError> {
            self.ensure_available()?;
            let mandates = self.mandates.read().await;
            let mut results: Vec<Mandate> = mandates
                .values()
                .filter(|m| m.tenant_id == tenant_id && m.party_id == party_id)
                .cloned()
                .collect();
            results.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(Page::from_vec(results, page))
        }

        async fn find_snapshots(
            &self,
            tenant_id: TenantId,
            party_id: Option<PartyId>,
            page: &PageRequest,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Page<PartySnapshot>, PortError> {
            self.ensure_available()?;
            let snapshots = self.snapshots.read().await;
            let results: Vec<PartySnapshot> = snapshots
                .iter()
                .rev()
                .filter(|s| s.tenant_id == tenant_id && party_id.map_or(true, |id| s.party_id == id))
                .cloned()
                .collect();
            Ok(Page::from_vec(results, page))
        }

        async fn find_history(
            &self,
            tenant_id: TenantId,
            party_id: PartyId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<PartyHistory>, PortError> {
            self.ensure_available()?;
            Ok(self
                .history
                .read()
                .await
                .iter()
                .filter(|h| h.tenant_id == tenant_id && h.party_id == party_id)
                .cloned()
                .collect())
        }
    }

    #[async_trait]
    impl ReferenceDataStore for InMemoryPartyStore {
        async fn list_catalog(
            &self,
            tenant_id: TenantId,
            kind: CatalogKind,
            locale: Option<&LanguageIdentifier>,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<ReferenceItem>, PortError> {
            self.ensure_available()?;
            let reference = self.reference.read().await;
            let mut items: Vec<ReferenceItem> = reference
                .iter()
                .filter(|((tenant, k, l, _), _)| {
                    *tenant == tenant_id && *k == kind && locale.map_or(true, |wanted| wanted == l)
                })
                .map(|(_, item)| item.clone())
                .collect();
            items.sort_by(|a, b| {
                a.sort_index()
                    .cmp(&b.sort_index())
                    .then_with(|| a.code().cmp(b.code()))
                    .then_with(|| a.locale().to_string().cmp(&b.locale().to_string()))
            });
            Ok(items)
        }

        async fn list_all(
            &self,
            tenant_id: TenantId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Vec<ReferenceItem>, PortError> {
            self.ensure_available()?;
            let reference = self.reference.read().await;
            let mut items: Vec<ReferenceItem> = reference
                .values()
                .filter(|item| item.tenant_id() == tenant_id)
                .cloned()
                .collect();
            items.sort_by(|a, b| {
                a.kind()
                    .name()
                    .cmp(b.kind().name())
                    .then_with(|| a.sort_index().cmp(&b.sort_index()))
                    .then_with(|| a.code().cmp(b.code()))
            });
            Ok(items)
        }

        async fn put_item(
            &self,
            item: ReferenceItem,
            _metadata: Option<OperationMetadata>,
        ) -> Result<ReferenceItem, PortError> {
            self.ensure_available()?;
            let key = (item.tenant_id(), item.kind(), item.locale().clone(), item.code().to_string());
            self.reference.write().await.insert(key, item.clone());
            Ok(item)
        }

        async fn delete_item(
            &self,
            tenant_id: TenantId,
            kind: CatalogKind,
            locale: &LanguageIdentifier,
            code: &str,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.ensure_available()?;
            let key = (tenant_id, kind, locale.clone(), code.to_string());
            self.reference
                .write()
                .await
                .remove(&key)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found(kind.name(), code))
        }
    }
}
