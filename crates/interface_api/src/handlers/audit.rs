//! Snapshot and history handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use core_kernel::PartyId;
use domain_party::{PartyHistory, PartySnapshots, Snapshots};

use crate::auth::{permissions, ApiContext};
use crate::dto::ListQuery;
use crate::{error::ApiError, AppState};

/// Lists one party's snapshots, newest first
pub async fn party_snapshots(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PartySnapshots>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let found = state
        .service
        .get_party_snapshots(&ctx.request, PartyId::from_uuid(id), &query.page()?)
        .await?;
    Ok(Json(found))
}

pub async fn list_snapshots(
    State(state): State<AppState>,
    ctx: ApiContext,
    Query(query): Query<ListQuery>,
) -> Result<Json<Snapshots>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let found = state.service.get_snapshots(&ctx.request, &query.page()?).await?;
    Ok(Json(found))
}

pub async fn party_history(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PartyHistory>>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let history = state
        .service
        .get_party_history(&ctx.request, PartyId::from_uuid(id))
        .await?;
    Ok(Json(history))
}
