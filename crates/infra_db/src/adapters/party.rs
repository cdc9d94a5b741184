//! PostgreSQL Party Store
//!
//! This module provides the database adapter for the party domain,
//! implementing `PartyDataStore` and `ReferenceDataStore` on top of the
//! repositories in `crate::repositories`.
//!
//! # Overview
//!
//! The `PostgresPartyStore` serves as the bridge between the domain layer's
//! ports and the database layer. It:
//!
//! - Delegates each port operation to the matching repository
//! - Wraps repository results into `Page`s
//! - Translates `DatabaseError` into `PortError`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, PostgresPartyStore};
//! use domain_party::PartyService;
//! use std::sync::Arc;
//!
//! let pool = create_pool_from_url("postgres://localhost/party").await?;
//! let store = Arc::new(PostgresPartyStore::new(pool));
//! let service = PartyService::new(store.clone(), store);
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};
use unic_langid::LanguageIdentifier;

use core_kernel::{
    AdapterHealth, AssociationId, DomainPort, HealthCheckResult, HealthCheckable, MandateId,
    OperationMetadata, Page, PageRequest, PartyId, PortError, TenantId,
};
use domain_party::reference::{CatalogKind, ReferenceItem};
use domain_party::{
    Association, Mandate, Party, PartyAudit, PartyDataStore, PartyHistory, PartyQuery,
    PartySnapshot, ReferenceDataStore,
};

use crate::repositories::{
    AssociationRepository, AuditRepository, MandateRepository, PartyRepository,
    ReferenceRepository,
};

const ADAPTER_ID: &str = "postgres-party-store";

/// PostgreSQL-backed implementation of the party storage ports
///
/// # Health Checking
///
/// The store implements `HealthCheckable` by running `SELECT 1` on the
/// pool.
///
/// # Error Handling
///
/// Database errors are translated to `PortError` variants:
/// - missing rows -> `PortError::NotFound`
/// - unique violations -> `PortError::Duplicate`
/// - foreign key violations -> `PortError::NotFound` for the missing party
/// - connection and pool failures -> transient `PortError`s
/// - other errors -> `PortError::Internal`
#[derive(Debug, Clone)]
pub struct PostgresPartyStore {
    parties: PartyRepository,
    associations: AssociationRepository,
    mandates: MandateRepository,
    audit: AuditRepository,
    reference: ReferenceRepository,
    pool: PgPool,
}

impl PostgresPartyStore {
    /// Creates a new PostgreSQL party store
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            parties: PartyRepository::new(pool.clone()),
            associations: AssociationRepository::new(pool.clone()),
            mandates: MandateRepository::new(pool.clone()),
            audit: AuditRepository::new(pool.clone()),
            reference: ReferenceRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DomainPort for PostgresPartyStore {}

#[async_trait]
impl HealthCheckable for PostgresPartyStore {
    /// Checks database connectivity
    ///
    /// Performs a simple SELECT 1 query to verify the connection pool
    /// is operational and the database is responsive.
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => {
                warn!(error = %e, "Database health check failed");
                HealthCheckResult {
                    adapter_id: ADAPTER_ID.to_string(),
                    status: AdapterHealth::Unhealthy,
                    latency_ms,
                    message: Some(format!("Database error: {}", e)),
                    checked_at: Utc::now(),
                }
            }
        }
    }
}

#[async_trait]
impl PartyDataStore for PostgresPartyStore {
    #[instrument(skip(self, party, _metadata), fields(party_id = %party.id))]
    async fn insert_party(
        &self,
        party: Party,
        audit: PartyAudit,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Party, PortError> {
        debug!("Inserting party");
        self.parties
            .insert(&party, &audit)
            .await
            .map_err(|e| e.into_port("Party", party.id))?;
        Ok(party)
    }

    #[instrument(skip(self, _metadata), fields(party_id = %id))]
    async fn get_party(
        &self,
        tenant_id: TenantId,
        id: PartyId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Party, PortError> {
        debug!("Fetching party by ID");
        self.parties
            .get(tenant_id, id)
            .await
            .map_err(|e| e.into_port("Party", id))
    }

    #[instrument(skip(self, party, _metadata), fields(party_id = %party.id))]
    async fn update_party(
        &self,
        party: Party,
        audit: PartyAudit,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Party, PortError> {
        debug!("Updating party");
        self.parties
            .update(&party, &audit)
            .await
            .map_err(|e| e.into_port("Party", party.id))?;
        Ok(party)
    }

    #[instrument(skip(self, _metadata), fields(party_id = %id))]
    async fn delete_party(
        &self,
        tenant_id: TenantId,
        id: PartyId,
        audit: PartyAudit,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!("Deleting party");
        self.parties
            .delete(tenant_id, id, &audit)
            .await
            .map_err(|e| e.into_port("Party", id))
    }

    #[instrument(skip(self, _metadata))]
    async fn find_parties(
        &self,
        tenant_id: TenantId,
        query: &PartyQuery,
        page: &PageRequest,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Page<Party>, PortError> {
        debug!("Finding parties");
        let (parties, total) = self
            .parties
            .find(tenant_id, query, page)
            .await
            .map_err(|e| e.into_port("Party", "query"))?;
        Ok(Page::new(parties, page, total))
    }

    async fn party_exists(
        &self,
        tenant_id: TenantId,
        id: PartyId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError> {
        self.parties
            .exists(tenant_id, id)
            .await
            .map_err(|e| e.into_port("Party", id))
    }

    #[instrument(skip(self, association, _metadata), fields(association_id = %association.id))]
    async fn insert_association(
        &self,
        association: Association,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Association, PortError> {
        debug!("Inserting association");
        self.associations
            .insert(&association)
            .await
            .map_err(|e| e.into_port("Association", association.id))?;
        Ok(association)
    }

    async fn get_association(
        &self,
        tenant_id: TenantId,
        id: AssociationId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Association, PortError> {
        self.associations
            .get(tenant_id, id)
            .await
            .map_err(|e| e.into_port("Association", id))
    }

    #[instrument(skip(self, association, _metadata), fields(association_id = %association.id))]
    async fn update_association(
        &self,
        association: Association,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Association, PortError> {
        debug!("Updating association");
        self.associations
            .update(&association)
            .await
            .map_err(|e| e.into_port("Association", association.id))?;
        Ok(association)
    }

    async fn delete_association(
        &self,
        tenant_id: TenantId,
        id: AssociationId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        self.associations
            .delete(tenant_id, id)
            .await
            .map_err(|e| e.into_port("Association", id))
    }

    #[instrument(skip(self, _metadata), fields(party_id = %party_id))]
    async fn find_associations(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: &PageRequest,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Page<Association>, PortError> {
        let (associations, total) = self
            .associations
            .find_for_party(tenant_id, party_id, page)
            .await
            .map_err(|e| e.into_port("Association", party_id))?;
        Ok(Page::new(associations, page, total))
    }

    #[instrument(skip(self, mandate, _metadata), fields(mandate_id = %mandate.id))]
    async fn insert_mandate(
        &self,
        mandate: Mandate,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Mandate, PortError> {
        debug!("Inserting mandate");
        self.mandates
            .insert(&mandate)
            .await
            .map_err(|e| e.into_port("Mandate", mandate.id))?;
        Ok(mandate)
    }

    async fn get_mandate(
        &self,
        tenant_id: TenantId,
        id: MandateId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Mandate, PortError> {
        self.mandates
            .get(tenant_id, id)
            .await
            .map_err(|e| e.into_port("Mandate", id))
    }

    #[instrument(skip(self, mandate, _metadata), fields(mandate_id = %mandate.id))]
    async fn update_mandate(
        &self,
        mandate: Mandate,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Mandate, PortError> {
        debug!("Updating mandate");
        self.mandates
            .update(&mandate)
            .await
            .map_err(|e| e.into_port("Mandate", mandate.id))?;
        Ok(mandate)
    }

    async fn delete_mandate(
        &self,
        tenant_id: TenantId,
        id: MandateId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        self.mandates
            .delete(tenant_id, id)
            .await
            .map_err(|e| e.into_port("Mandate", id))
    }

    #[instrument(skip(self, _metadata), fields(party_id = %party_id))]
    async fn find_mandates(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        page: &PageRequest,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Page<Mandate>, PortError> {
        let (mandates, total) = self
            .mandates
            .find_for_party(tenant_id, party_id, page)
            .await
            .map_err(|e| e.into_port("Mandate", party_id))?;
        Ok(Page::new(mandates, page, total))
    }

    async fn find_snapshots(
        &self,
        tenant_id: TenantId,
        party_id: Option<PartyId>,
        page: &PageRequest,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Page<PartySnapshot>, PortError> {
        let (snapshots, total) = self
            .audit
            .find_snapshots(tenant_id, party_id, page)
            .await
            .map_err(|e| e.into_port("PartySnapshot", tenant_id))?;
        Ok(Page::new(snapshots, page, total))
    }

    async fn find_history(
        &self,
        tenant_id: TenantId,
        party_id: PartyId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<PartyHistory>, PortError> {
        self.audit
            .find_history(tenant_id, party_id)
            .await
            .map_err(|e| e.into_port("PartyHistory", party_id))
    }
}

#[async_trait]
impl ReferenceDataStore for PostgresPartyStore {
    #[instrument(skip(self, _metadata), fields(catalog = %kind))]
    async fn list_catalog(
        &self,
        tenant_id: TenantId,
        kind: CatalogKind,
        locale: Option<&LanguageIdentifier>,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<ReferenceItem>, PortError> {
        self.reference
            .list(tenant_id, kind, locale)
            .await
            .map_err(|e| e.into_port(kind.name(), tenant_id))
    }

    async fn list_all(
        &self,
        tenant_id: TenantId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<ReferenceItem>, PortError> {
        self.reference
            .list_all(tenant_id)
            .await
            .map_err(|e| e.into_port("ReferenceItem", tenant_id))
    }

    #[instrument(skip(self, item, _metadata))]
    async fn put_item(
        &self,
        item: ReferenceItem,
        _metadata: Option<OperationMetadata>,
    ) -> Result<ReferenceItem, PortError> {
        use domain_party::reference::ReferenceData;

        debug!(catalog = %item.kind(), code = item.code(), "Storing catalog row");
        self.reference
            .upsert(&item)
            .await
            .map_err(|e| e.into_port(item.kind().name(), item.code()))?;
        Ok(item)
    }

    #[instrument(skip(self, _metadata), fields(catalog = %kind, code = code))]
    async fn delete_item(
        &self,
        tenant_id: TenantId,
        kind: CatalogKind,
        locale: &LanguageIdentifier,
        code: &str,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        self.reference
            .delete(tenant_id, kind, locale, code)
            .await
            .map_err(|e| e.into_port(kind.name(), code))
    }
}
