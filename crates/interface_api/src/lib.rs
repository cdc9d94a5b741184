//! HTTP API Layer
//!
//! This crate provides the REST API for the party master-data system using
//! Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for parties, relationships, audit rows
//!   and reference catalogs
//! - **Middleware**: JWT authentication, audit logging, request IDs, tracing
//! - **DTOs**: Request bodies and query strings
//! - **Error Handling**: `PartyError` mapped onto consistent error responses
//!
//! Every protected route acts for the tenant named in the caller's token.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::in_memory(config);
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_party::{InMemoryPartyStore, PartyService};
use infra_db::{DatabasePool, PostgresPartyStore};

use crate::config::ApiConfig;
use crate::handlers::{audit, health, party, reference, relationship};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: PartyService,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(service: PartyService, config: ApiConfig) -> Self {
        Self { service, config }
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: DatabasePool, config: ApiConfig) -> Self {
        let store = Arc::new(PostgresPartyStore::new(pool));
        Self::new(PartyService::new(store.clone(), store), config)
    }

    /// State backed by an in-process store
    pub fn in_memory(config: ApiConfig) -> Self {
        let store = Arc::new(InMemoryPartyStore::new());
        Self::new(PartyService::new(store.clone(), store), config)
    }
}

/// Creates the main API router
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let organization_routes = Router::new()
        .route("/", get(party::list_organizations).post(party::create_organization))
        .route(
            "/:id",
            get(party::get_organization)
                .put(party::update_organization)
                .delete(party::delete_organization),
        );

    let person_routes = Router::new()
        .route("/", get(party::list_persons).post(party::create_person))
        .route(
            "/:id",
            get(party::get_person)
                .put(party::update_person)
                .delete(party::delete_person),
        );

    let party_routes = Router::new()
        .route("/", get(party::list_parties))
        .route("/:id", get(party::get_party).delete(party::delete_party))
        .route("/:id/associations", get(relationship::associations_for_party))
        .route("/:id/mandates", get(relationship::mandates_for_party))
        .route("/:id/snapshots", get(audit::party_snapshots))
        .route("/:id/history", get(audit::party_history));

    let association_routes = Router::new()
        .route("/", post(relationship::create_association))
        .route(
            "/:id",
            get(relationship::get_association)
                .put(relationship::update_association)
                .delete(relationship::delete_association),
        );

    let mandate_routes = Router::new()
        .route("/", post(relationship::create_mandate))
        .route(
            "/:id",
            get(relationship::get_mandate)
                .put(relationship::update_mandate)
                .delete(relationship::delete_mandate),
        );

    let reference_routes = Router::new()
        .route("/", get(reference::list_catalogs))
        .route(
            "/:catalog",
            get(reference::get_catalog).put(reference::put_catalog_item),
        )
        .route("/:catalog/:locale/:code", delete(reference::delete_catalog_item));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/organizations", organization_routes)
        .nest("/persons", person_routes)
        .nest("/parties", party_routes)
        .route("/snapshots", get(audit::list_snapshots))
        .nest("/associations", association_routes)
        .nest("/mandates", mandate_routes)
        .nest("/reference", reference_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
