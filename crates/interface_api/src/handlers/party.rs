//! Party handlers
//!
//! Organizations and persons have their own typed routes; `/parties` lists
//! and reads either type.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::PartyId;
use domain_party::{Organizations, Parties, Party, Persons};

use crate::auth::{permissions, ApiContext};
use crate::dto::{ListQuery, OrganizationRequest, PersonRequest};
use crate::{error::ApiError, AppState};

// ============================================================================
// Organizations
// ============================================================================

/// Creates an organization
pub async fn create_organization(
    State(state): State<AppState>,
    ctx: ApiContext,
    Json(request): Json<OrganizationRequest>,
) -> Result<(StatusCode, Json<Party>), ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    let party = request.into_party(ctx.tenant_id(), None);
    let party = state.service.create_organization(&ctx.request, party).await?;
    Ok((StatusCode::CREATED, Json(party)))
}

/// Lists organizations with their child facts
pub async fn list_organizations(
    State(state): State<AppState>,
    ctx: ApiContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Organizations>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let page = query.page()?;
    let found = state
        .service
        .find_organizations(&ctx.request, query.party_query()?, &page)
        .await?;
    Ok(Json(found))
}

pub async fn get_organization(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Party>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let party = state
        .service
        .get_organization(&ctx.request, PartyId::from_uuid(id))
        .await?;
    Ok(Json(party))
}

/// Replaces an organization and its child facts
pub async fn update_organization(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
    Json(request): Json<OrganizationRequest>,
) -> Result<Json<Party>, ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    let party = request.into_party(ctx.tenant_id(), Some(PartyId::from_uuid(id)));
    let party = state.service.update_organization(&ctx.request, party).await?;
    Ok(Json(party))
}

pub async fn delete_organization(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    state
        .service
        .delete_organization(&ctx.request, PartyId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Persons
// ============================================================================

/// Creates a person
pub async fn create_person(
    State(state): State<AppState>,
    ctx: ApiContext,
    Json(request): Json<PersonRequest>,
) -> Result<(StatusCode, Json<Party>), ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    let party = request.into_party(ctx.tenant_id(), None);
    let party = state.service.create_person(&ctx.request, party).await?;
    Ok((StatusCode::CREATED, Json(party)))
}

pub async fn list_persons(
    State(state): State<AppState>,
    ctx: ApiContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Persons>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let page = query.page()?;
    let found = state
        .service
        .find_persons(&ctx.request, query.party_query()?, &page)
        .await?;
    Ok(Json(found))
}

pub async fn get_person(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Party>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let party = state.service.get_person(&ctx.request, PartyId::from_uuid(id)).await?;
    Ok(Json(party))
}

pub async fn update_person(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
    Json(request): Json<PersonRequest>,
) -> Result<Json<Party>, ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    let party = request.into_party(ctx.tenant_id(), Some(PartyId::from_uuid(id)));
    let party = state.service.update_person(&ctx.request, party).await?;
    Ok(Json(party))
}

pub async fn delete_person(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    state.service.delete_person(&ctx.request, PartyId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Parties of either type
// ============================================================================

/// Lists party root records
pub async fn list_parties(
    State(state): State<AppState>,
    ctx: ApiContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Parties>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let page = query.page()?;
    let found = state
        .service
        .find_parties(&ctx.request, query.party_query()?, &page)
        .await?;
    Ok(Json(found))
}

pub async fn get_party(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Party>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let party = state.service.get_party(&ctx.request, PartyId::from_uuid(id)).await?;
    Ok(Json(party))
}

pub async fn delete_party(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    state.service.remove_party(&ctx.request, PartyId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
