//! Party domain service
//!
//! `PartyService` is the entry point the API layer talks to. It owns the
//! write path of every aggregate:
//!
//! 1. scope the record to the caller's tenant and claim child facts
//! 2. validate structure, then codes against the tenant's catalogs
//! 3. stamp audit timestamps
//! 4. persist through the `PartyDataStore` port, together with a snapshot
//!    and a history row in the same store operation
//!
//! Reads are tenant-scoped and check the party type where the caller asked
//! for a person or an organization specifically.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use unic_langid::LanguageIdentifier;

use core_kernel::{
    AssociationId, AuditStamps, HealthCheckResult, MandateId, OperationMetadata, Page,
    PageRequest, PartyId, TenantId,
};

use crate::association::Association;
use crate::error::{EntityKind, PartyError};
use crate::mandate::Mandate;
use crate::party::{Party, PartyType};
use crate::ports::{PartyDataStore, PartyQuery, ReferenceDataStore};
use crate::reference::{CatalogIndex, CatalogKind, ReferenceData, ReferenceItem};
use crate::results::{AssociationsForParty, Organizations, Parties, PartySnapshots, Persons, Snapshots};
use crate::snapshot::{ChangeKind, PartyAudit, PartyHistory};
use crate::validation::{PartyValidator, ValidationResult};

/// Who is calling and on behalf of which tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub tenant_id: TenantId,
    pub actor: Option<String>,
    pub correlation_id: Option<String>,
}

impl RequestContext {
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            actor: None,
            correlation_id: None,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Port metadata carrying the actor and correlation ID
    pub fn metadata(&self) -> Option<OperationMetadata> {
        Some(OperationMetadata {
            correlation_id: self.correlation_id.clone(),
            initiated_by: self.actor.clone(),
            source_system: None,
            context: Default::default(),
        })
    }
}

/// Application service for party master data
#[derive(Clone)]
pub struct PartyService {
    store: Arc<dyn PartyDataStore>,
    reference: Arc<dyn ReferenceDataStore>,
}

impl PartyService {
    /// Creates a service over the given storage ports
    pub fn new(store: Arc<dyn PartyDataStore>, reference: Arc<dyn ReferenceDataStore>) -> Self {
        Self { store, reference }
    }

    // ========================================================================
    // Organizations
    // ========================================================================

    pub async fn create_organization(&self, ctx: &RequestContext, party: Party) -> Result<Party, PartyError> {
        self.create_party(ctx, party, PartyType::Organization).await
    }

    pub async fn get_organization(&self, ctx: &RequestContext, id: PartyId) -> Result<Party, PartyError> {
        self.get_typed(ctx, id, PartyType::Organization).await
    }

    pub async fn update_organization(&self, ctx: &RequestContext, party: Party) -> Result<Party, PartyError> {
        self.update_party(ctx, party, PartyType::Organization).await
    }

    pub async fn delete_organization(&self, ctx: &RequestContext, id: PartyId) -> Result<(), PartyError> {
        self.delete_party(ctx, id, Some(PartyType::Organization)).await
    }

    pub async fn find_organizations(
        &self,
        ctx: &RequestContext,
        query: PartyQuery,
        page: &PageRequest,
    ) -> Result<Organizations, PartyError> {
        self.find_full(ctx, query.of_type(PartyType::Organization), page).await
    }

    // ========================================================================
    // Persons
    // ========================================================================

    pub async fn create_person(&self, ctx: &RequestContext, party: Party) -> Result<Party, PartyError> {
        self.create_party(ctx, party, PartyType::Person).await
    }

    pub async fn get_person(&self, ctx: &RequestContext, id: PartyId) -> Result<Party, PartyError> {
        self.get_typed(ctx, id, PartyType::Person).await
    }

    pub async fn update_person(&self, ctx: &RequestContext, party: Party) -> Result<Party, PartyError> {
        self.update_party(ctx, party, PartyType::Person).await
    }

    pub async fn delete_person(&self, ctx: &RequestContext, id: PartyId) -> Result<(), PartyError> {
        self.delete_party(ctx, id, Some(PartyType::Person)).await
    }

    pub async fn find_persons(
        &self,
        ctx: &RequestContext,
        query: PartyQuery,
        page: &PageRequest,
    ) -> Result<Persons, PartyError> {
        self.find_full(ctx, query.of_type(PartyType::Person), page).await
    }

    // ========================================================================
    // Parties of either type
    // ========================================================================

    /// Retrieves a party of either type
    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, party_id = %id))]
    pub async fn get_party(&self, ctx: &RequestContext, id: PartyId) -> Result<Party, PartyError> {
        debug!("Fetching party");
        self.store
            .get_party(ctx.tenant_id, id, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Party, id))
    }

    /// Lists root records of either type
    #[instrument(skip(self, ctx, page), fields(tenant_id = %ctx.tenant_id))]
    pub async fn find_parties(
        &self,
        ctx: &RequestContext,
        query: PartyQuery,
        page: &PageRequest,
    ) -> Result<Parties, PartyError> {
        debug!("Finding parties with query: {:?}", query);
        Ok(self.find_full(ctx, query, page).await?.map(|party| party.summary()))
    }

    /// Removes a party of either type with its associations and mandates
    pub async fn remove_party(&self, ctx: &RequestContext, id: PartyId) -> Result<(), PartyError> {
        self.delete_party(ctx, id, None).await
    }

    #[instrument(skip(self, ctx, party), fields(tenant_id = %ctx.tenant_id, party_id = %party.id))]
    async fn create_party(
        &self,
        ctx: &RequestContext,
        mut party: Party,
        expected: PartyType,
    ) -> Result<Party, PartyError> {
        ensure_type(&party, expected)?;
        party.tenant_id = ctx.tenant_id;
        party.claim_children();
        self.check_party(ctx, &party).await?;

        party.audit = AuditStamps::new(ctx.actor.as_deref());
        let id = party.id;
        let audit = audit_rows(ctx, &party, ChangeKind::Created)?;
        let party = self
            .store
            .insert_party(party, audit, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Party, id))?;

        info!(party_type = %expected, "Party created");
        Ok(party)
    }

    #[instrument(skip(self, ctx, party), fields(tenant_id = %ctx.tenant_id, party_id = %party.id))]
    async fn update_party(
        &self,
        ctx: &RequestContext,
        mut party: Party,
        expected: PartyType,
    ) -> Result<Party, PartyError> {
        ensure_type(&party, expected)?;
        let existing = self.get_typed(ctx, party.id, expected).await?;

        party.tenant_id = ctx.tenant_id;
        party.claim_children();
        self.check_party(ctx, &party).await?;

        party.audit = existing.audit;
        party.audit.touch(ctx.actor.as_deref());
        let id = party.id;
        let audit = audit_rows(ctx, &party, ChangeKind::Updated)?;
        let party = self
            .store
            .update_party(party, audit, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Party, id))?;

        info!("Party updated");
        Ok(party)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, party_id = %id))]
    async fn delete_party(
        &self,
        ctx: &RequestContext,
        id: PartyId,
        expected: Option<PartyType>,
    ) -> Result<(), PartyError> {
        let party = match expected {
            Some(party_type) => self.get_typed(ctx, id, party_type).await?,
            None => self.get_party(ctx, id).await?,
        };
        let audit = audit_rows(ctx, &party, ChangeKind::Deleted)?;
        self.store
            .delete_party(ctx.tenant_id, id, audit, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Party, id))?;

        info!("Party deleted");
        Ok(())
    }

    async fn get_typed(&self, ctx: &RequestContext, id: PartyId, expected: PartyType) -> Result<Party, PartyError> {
        let party = self.get_party(ctx, id).await?;
        ensure_type(&party, expected)?;
        Ok(party)
    }

    async fn find_full(
        &self,
        ctx: &RequestContext,
        query: PartyQuery,
        page: &PageRequest,
    ) -> Result<Page<Party>, PartyError> {
        self.store
            .find_parties(ctx.tenant_id, &query, &page.clamped(), ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Party, ctx.tenant_id))
    }

    /// Runs structural and catalog validation, failing on any error
    async fn check_party(&self, ctx: &RequestContext, party: &Party) -> Result<(), PartyError> {
        let mut result = PartyValidator::validate(party);
        let catalogs = self.catalog_index(ctx).await?;
        result.merge(PartyValidator::validate_against_catalogs(party, &catalogs));
        into_outcome(result)
    }

    // ========================================================================
    // Associations
    // ========================================================================

    #[instrument(skip(self, ctx, association), fields(tenant_id = %ctx.tenant_id, association_id = %association.id))]
    pub async fn create_association(
        &self,
        ctx: &RequestContext,
        mut association: Association,
    ) -> Result<Association, PartyError> {
        association.tenant_id = ctx.tenant_id;
        self.check_association(ctx, &association).await?;

        association.audit = AuditStamps::new(ctx.actor.as_deref());
        let id = association.id;
        let association = self
            .store
            .insert_association(association, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Association, id))?;
        info!(association_type = %association.association_type, "Association created");
        Ok(association)
    }

    pub async fn get_association(&self, ctx: &RequestContext, id: AssociationId) -> Result<Association, PartyError> {
        self.store
            .get_association(ctx.tenant_id, id, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Association, id))
    }

    #[instrument(skip(self, ctx, association), fields(tenant_id = %ctx.tenant_id, association_id = %association.id))]
    pub async fn update_association(
        &self,
        ctx: &RequestContext,
        mut association: Association,
    ) -> Result<Association, PartyError> {
        let existing = self.get_association(ctx, association.id).await?;
        association.tenant_id = ctx.tenant_id;
        self.check_association(ctx, &association).await?;

        association.audit = existing.audit;
        association.audit.touch(ctx.actor.as_deref());
        let id = association.id;
        let association = self
            .store
            .update_association(association, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Association, id))?;
        info!("Association updated");
        Ok(association)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, association_id = %id))]
    pub async fn delete_association(&self, ctx: &RequestContext, id: AssociationId) -> Result<(), PartyError> {
        self.store
            .delete_association(ctx.tenant_id, id, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Association, id))?;
        info!("Association deleted");
        Ok(())
    }

    /// Lists the associations a party takes part in
    pub async fn get_associations_for_party(
        &self,
        ctx: &RequestContext,
        party_id: PartyId,
        page: &PageRequest,
    ) -> Result<AssociationsForParty, PartyError> {
        self.ensure_party_exists(ctx, party_id).await?;
        let associations = self
            .store
            .find_associations(ctx.tenant_id, party_id, &page.clamped(), ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Party, party_id))?;
        Ok(AssociationsForParty { party_id, associations })
    }

    async fn check_association(&self, ctx: &RequestContext, association: &Association) -> Result<(), PartyError> {
        let from = self.get_party(ctx, association.from_party_id).await?;
        let to = self.get_party(ctx, association.to_party_id).await?;
        let catalogs = self.catalog_index(ctx).await?;
        into_outcome(PartyValidator::validate_association(association, &from, &to, &catalogs))
    }

    // ========================================================================
    // Mandates
    // ========================================================================

    #[instrument(skip(self, ctx, mandate), fields(tenant_id = %ctx.tenant_id, mandate_id = %mandate.id))]
    pub async fn create_mandate(&self, ctx: &RequestContext, mut mandate: Mandate) -> Result<Mandate, PartyError> {
        mandate.tenant_id = ctx.tenant_id;
        mandate.claim_children();
        self.check_mandate(ctx, &mandate).await?;

        mandate.audit = AuditStamps::new(ctx.actor.as_deref());
        let id = mandate.id;
        let mandate = self
            .store
            .insert_mandate(mandate, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Mandate, id))?;
        info!(mandate_type = %mandate.mandate_type, "Mandate created");
        Ok(mandate)
    }

    pub async fn get_mandate(&self, ctx: &RequestContext, id: MandateId) -> Result<Mandate, PartyError> {
        self.store
            .get_mandate(ctx.tenant_id, id, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Mandate, id))
    }

    #[instrument(skip(self, ctx, mandate), fields(tenant_id = %ctx.tenant_id, mandate_id = %mandate.id))]
    pub async fn update_mandate(&self, ctx: &RequestContext, mut mandate: Mandate) -> Result<Mandate, PartyError> {
        let existing = self.get_mandate(ctx, mandate.id).await?;
        mandate.tenant_id = ctx.tenant_id;
        mandate.claim_children();
        self.check_mandate(ctx, &mandate).await?;

        mandate.audit = existing.audit;
        mandate.audit.touch(ctx.actor.as_deref());
        let id = mandate.id;
        let mandate = self
            .store
            .update_mandate(mandate, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Mandate, id))?;
        info!("Mandate updated");
        Ok(mandate)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id, mandate_id = %id))]
    pub async fn delete_mandate(&self, ctx: &RequestContext, id: MandateId) -> Result<(), PartyError> {
        self.store
            .delete_mandate(ctx.tenant_id, id, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Mandate, id))?;
        info!("Mandate deleted");
        Ok(())
    }

    /// Lists the mandates a party has granted
    pub async fn get_mandates_for_party(
        &self,
        ctx: &RequestContext,
        party_id: PartyId,
        page: &PageRequest,
    ) -> Result<Page<Mandate>, PartyError> {
        self.ensure_party_exists(ctx, party_id).await?;
        self.store
            .find_mandates(ctx.tenant_id, party_id, &page.clamped(), ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Party, party_id))
    }

    async fn check_mandate(&self, ctx: &RequestContext, mandate: &Mandate) -> Result<(), PartyError> {
        self.ensure_party_exists(ctx, mandate.party_id).await?;
        for mandatary in mandate.mandataries.iter() {
            self.ensure_party_exists(ctx, mandatary.party_id).await?;
        }
        let catalogs = self.catalog_index(ctx).await?;
        into_outcome(PartyValidator::validate_mandate(mandate, &catalogs))
    }

    async fn ensure_party_exists(&self, ctx: &RequestContext, id: PartyId) -> Result<(), PartyError> {
        let exists = self
            .store
            .party_exists(ctx.tenant_id, id, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Party, id))?;
        if exists {
            Ok(())
        } else {
            Err(PartyError::not_found(id))
        }
    }

    // ========================================================================
    // Snapshots and history
    // ========================================================================

    /// Lists one party's snapshots, newest first
    ///
    /// Snapshots outlive the party, so this works for deleted parties too.
    pub async fn get_party_snapshots(
        &self,
        ctx: &RequestContext,
        party_id: PartyId,
        page: &PageRequest,
    ) -> Result<PartySnapshots, PartyError> {
        let snapshots = self
            .store
            .find_snapshots(ctx.tenant_id, Some(party_id), &page.clamped(), ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Snapshot, party_id))?;
        Ok(PartySnapshots { party_id, snapshots })
    }

    /// Lists snapshots of every party of the tenant, newest first
    pub async fn get_snapshots(&self, ctx: &RequestContext, page: &PageRequest) -> Result<Snapshots, PartyError> {
        self.store
            .find_snapshots(ctx.tenant_id, None, &page.clamped(), ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Snapshot, ctx.tenant_id))
    }

    pub async fn get_party_history(
        &self,
        ctx: &RequestContext,
        party_id: PartyId,
    ) -> Result<Vec<PartyHistory>, PartyError> {
        self.store
            .find_history(ctx.tenant_id, party_id, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::Snapshot, party_id))
    }

    // ========================================================================
    // Reference data
    // ========================================================================

    pub async fn get_catalog(
        &self,
        ctx: &RequestContext,
        kind: CatalogKind,
        locale: Option<&LanguageIdentifier>,
    ) -> Result<Vec<ReferenceItem>, PartyError> {
        self.reference
            .list_catalog(ctx.tenant_id, kind, locale, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::ReferenceData, kind))
    }

    /// Inserts or replaces a catalog row of the caller's tenant
    #[instrument(skip(self, ctx, item), fields(tenant_id = %ctx.tenant_id, catalog = %item.kind(), code = %item.code()))]
    pub async fn put_catalog_item(&self, ctx: &RequestContext, item: ReferenceItem) -> Result<ReferenceItem, PartyError> {
        if item.tenant_id() != ctx.tenant_id {
            return Err(PartyError::invalid("Catalog row belongs to another tenant"));
        }
        if let Err(errors) = item.validate_fields() {
            return Err(PartyError::validation_failed(vec![errors.to_string()]));
        }
        if let ReferenceItem::MandatePropertyType(row) = &item {
            if let Err(e) = row.compiled_pattern() {
                return Err(PartyError::invalid(format!("Invalid pattern: {}", e)));
            }
        }
        if let ReferenceItem::TaxNumberType(row) = &item {
            if let Err(e) = row.accepts("") {
                return Err(PartyError::invalid(format!("Invalid pattern: {}", e)));
            }
        }

        let code = item.code().to_string();
        let item = self
            .reference
            .put_item(item, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::ReferenceData, code))?;
        info!("Catalog row stored");
        Ok(item)
    }

    #[instrument(skip(self, ctx), fields(tenant_id = %ctx.tenant_id))]
    pub async fn delete_catalog_item(
        &self,
        ctx: &RequestContext,
        kind: CatalogKind,
        locale: &LanguageIdentifier,
        code: &str,
    ) -> Result<(), PartyError> {
        self.reference
            .delete_item(ctx.tenant_id, kind, locale, code, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::ReferenceData, format!("{}/{}", kind, code)))?;
        info!("Catalog row deleted");
        Ok(())
    }

    /// Loads every catalog of the caller's tenant into a lookup index
    pub async fn catalog_index(&self, ctx: &RequestContext) -> Result<CatalogIndex, PartyError> {
        let items = self
            .reference
            .list_all(ctx.tenant_id, ctx.metadata())
            .await
            .map_err(|e| PartyError::from_port(e, EntityKind::ReferenceData, ctx.tenant_id))?;
        Ok(items.iter().collect())
    }

    /// Health of the party store
    pub async fn health(&self) -> HealthCheckResult {
        self.store.health_check().await
    }
}

fn ensure_type(party: &Party, expected: PartyType) -> Result<(), PartyError> {
    let actual = party.party_type();
    if actual == expected {
        Ok(())
    } else {
        Err(PartyError::WrongPartyType {
            id: party.id.to_string(),
            expected,
            actual,
        })
    }
}

/// Builds the snapshot and history rows stored with a party write
fn audit_rows(ctx: &RequestContext, party: &Party, change: ChangeKind) -> Result<PartyAudit, PartyError> {
    PartyAudit::record(party, change, ctx.actor.as_deref(), ctx.correlation_id.clone())
        .map_err(|e| PartyError::Internal(e.to_string()))
}

fn into_outcome(result: ValidationResult) -> Result<(), PartyError> {
    for warning in &result.warnings {
        warn!(warning = %warning, "Validation warning");
    }
    if result.is_valid {
        Ok(())
    } else {
        Err(PartyError::validation_failed(result.errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::InMemoryPartyStore;
    use crate::party::{Organization, Person};
    use crate::document::TaxNumber;
    use crate::reference::{CatalogEntry, MandatePropertyType, PartyTypeFilter, StatusType, TaxNumberType};
    use crate::status::Status;
    use core_kernel::EffectivePeriod;

    fn setup() -> (PartyService, Arc<InMemoryPartyStore>, RequestContext) {
        let store = Arc::new(InMemoryPartyStore::new());
        let service = PartyService::new(store.clone(), store.clone());
        let ctx = RequestContext::new(TenantId::new()).with_actor("tester");
        (service, store, ctx)
    }

    fn entry(ctx: &RequestContext, code: &str) -> CatalogEntry {
        CatalogEntry::new(ctx.tenant_id, "en".parse().unwrap(), code, "")
    }

    fn person(ctx: &RequestContext, given: &str, family: &str) -> Party {
        Party::new_person(ctx.tenant_id, Person::new(given, family))
    }

    fn organization(ctx: &RequestContext, name: &str) -> Party {
        Party::new_organization(ctx.tenant_id, Organization::new(name))
    }

    #[tokio::test]
    async fn test_create_person_writes_audit_rows() {
        let (service, _, ctx) = setup();
        let created = service.create_person(&ctx, person(&ctx, "Ada", "Lovelace")).await.unwrap();

        assert_eq!(created.audit.created_by.as_deref(), Some("tester"));
        let snapshots = service
            .get_party_snapshots(&ctx, created.id, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(snapshots.snapshots.total_count, 1);
        assert_eq!(snapshots.latest().unwrap().restore().unwrap().display_name(), "Ada Lovelace");

        let history = service.get_party_history(&ctx, created.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].change, ChangeKind::Created);
    }

    #[tokio::test]
    async fn test_wrong_party_type() {
        let (service, _, ctx) = setup();
        let acme = service.create_organization(&ctx, organization(&ctx, "Acme")).await.unwrap();

        let result = service.get_person(&ctx, acme.id).await;
        assert!(matches!(
            result,
            Err(PartyError::WrongPartyType { expected: PartyType::Person, actual: PartyType::Organization, .. })
        ));

        let result = service.create_person(&ctx, organization(&ctx, "Other")).await;
        assert!(matches!(result, Err(PartyError::WrongPartyType { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_party() {
        let (service, _, ctx) = setup();
        let party = person(&ctx, "Ada", "Lovelace");
        service.create_person(&ctx, party.clone()).await.unwrap();

        let result = service.create_person(&ctx, party).await;
        assert!(matches!(result, Err(PartyError::DuplicateParty(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_creation_stamp() {
        let (service, _, ctx) = setup();
        let created = service.create_organization(&ctx, organization(&ctx, "Acme")).await.unwrap();

        let mut changed = created.clone();
        if let crate::party::PartyDetails::Organization(org) = &mut changed.details {
            org.legal_name = Some("Acme Holdings Ltd".to_string());
        }
        changed.audit = Default::default();
        let other = RequestContext::new(ctx.tenant_id).with_actor("editor");
        let updated = service.update_organization(&other, changed).await.unwrap();

        assert_eq!(updated.audit.created_at, created.audit.created_at);
        assert_eq!(updated.audit.created_by.as_deref(), Some("tester"));
        assert_eq!(updated.audit.updated_by.as_deref(), Some("editor"));
        assert_eq!(service.get_party_history(&ctx, created.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_party() {
        let (service, _, ctx) = setup();
        let result = service.update_person(&ctx, person(&ctx, "Ghost", "Writer")).await;
        assert!(matches!(result, Err(PartyError::PartyNotFound(_))));
    }

    #[tokio::test]
    async fn test_validation_failure() {
        let (service, _, ctx) = setup();
        let result = service.create_person(&ctx, person(&ctx, "", "Lovelace")).await;
        assert!(matches!(result, Err(PartyError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_catalog_enforced_on_write() {
        let (service, _, ctx) = setup();
        service
            .put_catalog_item(
                &ctx,
                StatusType::new(entry(&ctx, "DECEASED"), PartyTypeFilter::for_party_types(&[PartyType::Person]))
                    .into(),
            )
            .await
            .unwrap();

        let mut acme = organization(&ctx, "Acme");
        acme.statuses.upsert(Status::new(acme.id, "DECEASED", EffectivePeriod::open()));
        let result = service.create_organization(&ctx, acme).await;
        assert!(matches!(result, Err(PartyError::ValidationFailed(_))));

        let mut ada = person(&ctx, "Ada", "Lovelace");
        ada.statuses.upsert(Status::new(ada.id, "DECEASED", EffectivePeriod::open()));
        service.create_person(&ctx, ada).await.unwrap();
    }

    #[tokio::test]
    async fn test_catalogs_are_tenant_scoped() {
        let (service, _, ctx) = setup();
        let foreign = RequestContext::new(TenantId::new());
        let item: ReferenceItem =
            StatusType::new(entry(&foreign, "ACTIVE"), PartyTypeFilter::default()).into();

        let result = service.put_catalog_item(&ctx, item).await;
        assert!(matches!(result, Err(PartyError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_delete_catalog_item_not_found() {
        let (service, _, ctx) = setup();
        let en: LanguageIdentifier = "en".parse().unwrap();
        let result = service.delete_catalog_item(&ctx, CatalogKind::Gender, &en, "X").await;
        assert!(matches!(result, Err(PartyError::ReferenceDataNotFound(_))));
    }

    #[tokio::test]
    async fn test_associations() {
        let (service, _, ctx) = setup();
        let acme = service.create_organization(&ctx, organization(&ctx, "Acme")).await.unwrap();
        let ada = service.create_person(&ctx, person(&ctx, "Ada", "Lovelace")).await.unwrap();

        let employs = service
            .create_association(&ctx, Association::new(ctx.tenant_id, "EMPLOYS", acme.id, ada.id))
            .await
            .unwrap();
        let duplicate = service
            .create_association(&ctx, Association::new(ctx.tenant_id, "EMPLOYS", acme.id, ada.id))
            .await;
        assert!(matches!(duplicate, Err(PartyError::DuplicateAssociation(_))));

        let listed = service
            .get_associations_for_party(&ctx, ada.id, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(listed.counterparties(), vec![acme.id]);

        service.delete_association(&ctx, employs.id).await.unwrap();
        let missing = service.get_association(&ctx, employs.id).await;
        assert!(matches!(missing, Err(PartyError::AssociationNotFound(_))));
    }

    #[tokio::test]
    async fn test_association_requires_existing_parties() {
        let (service, _, ctx) = setup();
        let acme = service.create_organization(&ctx, organization(&ctx, "Acme")).await.unwrap();

        let result = service
            .create_association(&ctx, Association::new(ctx.tenant_id, "EMPLOYS", acme.id, PartyId::new()))
            .await;
        assert!(matches!(result, Err(PartyError::PartyNotFound(_))));
    }

    #[tokio::test]
    async fn test_mandates() {
        let (service, _, ctx) = setup();
        let acme = service.create_organization(&ctx, organization(&ctx, "Acme")).await.unwrap();
        let ada = service.create_person(&ctx, person(&ctx, "Ada", "Lovelace")).await.unwrap();
        service
            .put_catalog_item(
                &ctx,
                MandatePropertyType::new(entry(&ctx, "LIMIT"), Some(r"\d+".to_string())).into(),
            )
            .await
            .unwrap();

        let mut mandate = Mandate::new(ctx.tenant_id, acme.id, "SIGNATORY");
        mandate.add_mandatary(ada.id, "PERSON", "SIGNER");
        mandate.set_property("LIMIT", "ten thousand");
        let rejected = service.create_mandate(&ctx, mandate.clone()).await;
        assert!(matches!(rejected, Err(PartyError::ValidationFailed(_))));

        mandate.set_property("LIMIT", "10000");
        let created = service.create_mandate(&ctx, mandate).await.unwrap();
        let listed = service
            .get_mandates_for_party(&ctx, acme.id, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(listed.items[0].id, created.id);

        service.remove_party(&ctx, acme.id).await.unwrap();
        let gone = service.get_mandate(&ctx, created.id).await;
        assert!(matches!(gone, Err(PartyError::MandateNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_keeps_audit_trail() {
        let (service, _, ctx) = setup();
        let ada = service.create_person(&ctx, person(&ctx, "Ada", "Lovelace")).await.unwrap();
        service.delete_person(&ctx, ada.id).await.unwrap();

        assert!(matches!(service.get_party(&ctx, ada.id).await, Err(PartyError::PartyNotFound(_))));
        let history = service.get_party_history(&ctx, ada.id).await.unwrap();
        assert_eq!(history.last().map(|h| h.change), Some(ChangeKind::Deleted));
        let snapshots = service.get_snapshots(&ctx, &PageRequest::default()).await.unwrap();
        assert_eq!(snapshots.total_count, 1);
    }

    #[tokio::test]
    async fn test_find_parties_returns_summaries() {
        let (service, _, ctx) = setup();
        service.create_person(&ctx, person(&ctx, "Ada", "Lovelace")).await.unwrap();
        service.create_organization(&ctx, organization(&ctx, "Acme")).await.unwrap();

        let all = service
            .find_parties(&ctx, PartyQuery::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.total_count, 2);

        let organizations = service
            .find_organizations(&ctx, PartyQuery::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(organizations.total_count, 1);
        assert_eq!(organizations.items[0].display_name(), "Acme");

        let other_tenant = RequestContext::new(TenantId::new());
        let none = service
            .find_persons(&other_tenant, PartyQuery::default(), &PageRequest::default())
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_store_outage_maps_to_service_unavailable() {
        let (service, store, ctx) = setup();
        store.set_available(false);

        let result = service.get_party(&ctx, PartyId::new()).await;
        assert!(matches!(result, Err(PartyError::ServiceUnavailable(_))));
        assert!(!service.health().await.is_operational());
    }

    #[tokio::test]
    async fn test_tax_number_format_and_country_checked_on_write() {
        let (service, _, ctx) = setup();
        service
            .put_catalog_item(
                &ctx,
                TaxNumberType::new(entry(&ctx, "VAT"), PartyTypeFilter::for_party_types(&[PartyType::Person]))
                    .with_country("BE")
                    .with_pattern(r"BE0\d{9}")
                    .into(),
            )
            .await
            .unwrap();

        let mut garbage = person(&ctx, "Ada", "Lovelace");
        garbage.tax_numbers.upsert(TaxNumber::new(garbage.id, "VAT", "BE", "garbage"));
        match service.create_person(&ctx, garbage).await {
            Err(PartyError::ValidationFailed(errors)) => {
                assert!(errors.iter().any(|e| e.contains("does not match the format of VAT")), "{:?}", errors)
            }
            other => panic!("expected a validation failure, got {:?}", other),
        }

        let mut foreign = person(&ctx, "Ada", "Lovelace");
        foreign.tax_numbers.upsert(TaxNumber::new(foreign.id, "VAT", "NL", "BE0123456789"));
        match service.create_person(&ctx, foreign).await {
            Err(PartyError::ValidationFailed(errors)) => {
                assert!(errors.iter().any(|e| e.contains("issued in BE")), "{:?}", errors)
            }
            other => panic!("expected a validation failure, got {:?}", other),
        }

        let mut valid = person(&ctx, "Ada", "Lovelace");
        valid.tax_numbers.upsert(TaxNumber::new(valid.id, "VAT", "BE", "BE0123456789"));
        service.create_person(&ctx, valid).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_audit_write_leaves_no_party_behind() {
        let (service, store, ctx) = setup();
        let ada = person(&ctx, "Ada", "Lovelace");

        store.set_audit_failing(true);
        let result = service.create_person(&ctx, ada.clone()).await;
        match result {
            Err(PartyError::ServiceUnavailable(service_name)) => assert_eq!(service_name, "in-memory-audit-log"),
            other => panic!("expected an unavailable store, got {:?}", other),
        }
        assert!(matches!(service.get_party(&ctx, ada.id).await, Err(PartyError::PartyNotFound(_))));
        assert!(service.get_party_history(&ctx, ada.id).await.unwrap().is_empty());

        store.set_audit_failing(false);
        let created = service.create_person(&ctx, ada).await.unwrap();
        let history = service.get_party_history(&ctx, created.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].change, ChangeKind::Created);

        store.set_audit_failing(true);
        let mut renamed = created.clone();
        renamed.details = person(&ctx, "Augusta", "King").details;
        assert!(service.update_person(&ctx, renamed).await.is_err());
        assert!(service.delete_person(&ctx, created.id).await.is_err());
        store.set_audit_failing(false);

        let stored = service.get_person(&ctx, created.id).await.unwrap();
        assert_eq!(stored.display_name(), "Ada Lovelace");
        let snapshots = service
            .get_party_snapshots(&ctx, created.id, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(snapshots.snapshots.total_count, 1);
        assert_eq!(service.get_party_history(&ctx, created.id).await.unwrap().len(), 1);
    }
}
