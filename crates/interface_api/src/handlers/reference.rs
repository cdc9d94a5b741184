//! Reference-data handlers
//!
//! Catalogs are addressed by their snake_case name, e.g.
//! `/reference/tax_number_type`. Rows always belong to the caller's tenant:
//! the body of a PUT needs neither `catalog` nor `tenantId`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use domain_party::reference::{CatalogKind, ReferenceItem};

use crate::auth::{permissions, ApiContext};
use crate::dto::query::parse_locale;
use crate::dto::CatalogQuery;
use crate::{error::ApiError, AppState};

fn catalog_kind(name: &str) -> Result<CatalogKind, ApiError> {
    CatalogKind::from_name(name).ok_or_else(|| ApiError::NotFound(format!("Unknown catalog '{}'", name)))
}

/// Lists the names of every catalog
pub async fn list_catalogs(ctx: ApiContext) -> Result<Json<Vec<&'static str>>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    Ok(Json(CatalogKind::all().iter().map(|kind| kind.name()).collect()))
}

/// Lists one catalog, optionally for a single locale
pub async fn get_catalog(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(catalog): Path<String>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<ReferenceItem>>, ApiError> {
    ctx.require(permissions::PARTY_READ)?;
    let kind = catalog_kind(&catalog)?;
    let locale = query.locale()?;
    let items = state
        .service
        .get_catalog(&ctx.request, kind, locale.as_ref())
        .await?;
    Ok(Json(items))
}

/// Inserts or replaces a catalog row
pub async fn put_catalog_item(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path(catalog): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ReferenceItem>, ApiError> {
    ctx.require(permissions::REFERENCE_WRITE)?;
    let kind = catalog_kind(&catalog)?;

    let Value::Object(mut fields) = body else {
        return Err(ApiError::BadRequest("Catalog row must be a JSON object".to_string()));
    };
    fields.insert("catalog".to_string(), Value::from(kind.name()));
    fields.insert("tenantId".to_string(), Value::from(ctx.tenant_id().as_uuid().to_string()));
    let item: ReferenceItem = serde_json::from_value(Value::Object(fields))
        .map_err(|e| ApiError::BadRequest(format!("Invalid {} row: {}", kind.name(), e)))?;

    let item = state.service.put_catalog_item(&ctx.request, item).await?;
    Ok(Json(item))
}

pub async fn delete_catalog_item(
    State(state): State<AppState>,
    ctx: ApiContext,
    Path((catalog, locale, code)): Path<(String, String, String)>,
) -> Result<StatusCode, ApiError> {
    ctx.require(permissions::REFERENCE_WRITE)?;
    let kind = catalog_kind(&catalog)?;
    let locale = parse_locale(&locale)?;
    state
        .service
        .delete_catalog_item(&ctx.request, kind, &locale, &code)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
