//! Association and mandate handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use core_kernel::{AssociationId, MandateId, Page, PartyId};
use domain_party::{Association, AssociationsForParty, Mandate};

use crate::auth::{permissions, ApiContext};
use crate::dto::{AssociationRequest, ListQuery, MandateRequest};
use crate::{error::ApiError, AppState};

pub async fn create_association(
    State(state): State<AppState>,
    ctx: ApiContext,
    Json(request): Json<AssociationRequest>,
) -> Result<(StatusCode, Json<Association>), ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    let association = request.into_association(ctx.tenant_id(), None);
    let association = state.service.create_association(&ctx.request, association).await?;
    Ok((StatusCode::CREATED, Json(association)))
}

pub async fn get_association(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Association>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let association = state
        .service
        .get_association(&ctx.request, AssociationId::from_uuid(id))
        .await?;
    Ok(Json(association))
}

pub async fn update_association(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
    Json(request): Json<AssociationRequest>,
) -> Result<Json<Association>, ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    let association = request.into_association(ctx.tenant_id(), Some(AssociationId::from_uuid(id)));
    let association = state.service.update_association(&ctx.request, association).await?;
    Ok(Json(association))
}

pub async fn delete_association(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    state
        .service
        .delete_association(&ctx.request, AssociationId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the associations a party takes part in, from either end
pub async fn associations_for_party(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AssociationsForParty>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let found = state
        .service
        .get_associations_for_party(&ctx.request, PartyId::from_uuid(id), &query.page()?)
        .await?;
    Ok(Json(found))
}

pub async fn create_mandate(
    State(state): State<AppState>,
    ctx: ApiContext,
    Json(request): Json<MandateRequest>,
) -> Result<(StatusCode, Json<Mandate>), ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    let mandate = request.into_mandate(ctx.tenant_id(), None);
    let mandate = state.service.create_mandate(&ctx.request, mandate).await?;
    Ok((StatusCode::CREATED, Json(mandate)))
}

pub async fn get_mandate(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Mandate>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let mandate = state.service.get_mandate(&ctx.request, MandateId::from_uuid(id)).await?;
    Ok(Json(mandate))
}

pub async fn update_mandate(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
    Json(request): Json<MandateRequest>,
) -> Result<Json<Mandate>, ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    let mandate = request.into_mandate(ctx.tenant_id(), Some(MandateId::from_uuid(id)));
    let mandate = state.service.update_mandate(&ctx.request, mandate).await?;
    Ok(Json(mandate))
}

pub async fn delete_mandate(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    ctx.require(permissions::PARTY_WRITE)?;
    state.service.delete_mandate(&ctx.request, MandateId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the mandates a party has granted
pub async fn mandates_for_party(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Mandate>>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let found = state
        .service
        .get_mandates_for_party(&ctx.request, PartyId::from_uuid(id), &query.page()?)
        .await?;
    Ok(Json(found))
}
