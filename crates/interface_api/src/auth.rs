//! Authentication and authorization
//!
//! Every protected request carries a bearer JWT. Its claims name the caller,
//! the tenant whose data the caller may see, and the roles that gate reads
//! and writes. [`ApiContext`] turns the validated claims into the
//! `RequestContext` the party service expects.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use core_kernel::TenantId;
use domain_party::RequestContext;

use crate::error::ApiError;

/// Header carrying the request ID set by the request-id layer
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Tenant the caller acts for
    pub tenant_id: Uuid,
    /// User's roles
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Missing permission: {0}")]
    MissingPermission(String),
}

/// Creates a new JWT token
///
/// # Arguments
///
/// * `user_id` - User identifier
/// * `tenant_id` - Tenant the token grants access to
/// * `roles` - User's roles
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    user_id: &str,
    tenant_id: TenantId,
    roles: Vec<String>,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        tenant_id: *tenant_id.as_uuid(),
        roles,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Checks if user has required role
pub fn has_role(claims: &Claims, required_role: &str) -> bool {
    claims.roles.iter().any(|r| r == required_role || r == "admin")
}

/// Permission definitions
pub mod permissions {
    pub const PARTY_READ: &str = "party:read";
    pub const PARTY_WRITE: &str = "party:write";
    pub const REFERENCE_WRITE: &str = "reference:write";
}

/// The authenticated caller of a handler
///
/// Extracted from the claims the auth middleware stored on the request. The
/// `x-request-id` header becomes the correlation ID of every audit row the
/// request writes.
#[derive(Debug, Clone)]
pub struct ApiContext {
    pub claims: Claims,
    pub request: RequestContext,
}

impl ApiContext {
    pub fn from_claims(claims: Claims, correlation_id: Option<&str>) -> Self {
        let mut request = RequestContext::new(TenantId::from_uuid(claims.tenant_id))
            .with_actor(claims.sub.clone());
        if let Some(id) = correlation_id {
            request = request.with_correlation_id(id);
        }
        Self { claims, request }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.request.tenant_id
    }

    /// Fails with `Forbidden` unless the caller holds `permission`
    pub fn require(&self, permission: &str) -> Result<(), ApiError> {
        if has_role(&self.claims, permission) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                AuthError::MissingPermission(permission.to_string()).to_string(),
            ))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ApiContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or(ApiError::Unauthorized)?;
        let correlation_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok());
        Ok(ApiContext::from_claims(claims, correlation_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_round_trip_keeps_tenant() {
        let tenant = TenantId::new();
        let token = create_token("alice", tenant, vec!["party:read".into()], SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(TenantId::from_uuid(claims.tenant_id), tenant);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = create_token("alice", TenantId::new(), vec![], SECRET, 60).unwrap();
        assert!(matches!(validate_token(&token, "other"), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_admin_holds_every_permission() {
        let token = create_token("root", TenantId::new(), vec!["admin".into()], SECRET, 60).unwrap();
        let claims = validate_token(&token, SECRET).unwrap();
        assert!(has_role(&claims, permissions::REFERENCE_WRITE));
    }

    #[test]
    fn test_context_carries_actor_and_correlation_id() {
        let tenant = TenantId::new();
        let claims = Claims {
            sub: "bob".into(),
            tenant_id: *tenant.as_uuid(),
            roles: vec![permissions::PARTY_READ.into()],
            exp: 0,
            iat: 0,
        };
        let ctx = ApiContext::from_claims(claims, Some("req-1"));

        assert_eq!(ctx.tenant_id(), tenant);
        assert_eq!(ctx.request.actor.as_deref(), Some("bob"));
        assert_eq!(ctx.request.correlation_id.as_deref(), Some("req-1"));
        assert!(ctx.require(permissions::PARTY_READ).is_ok());
        assert!(matches!(ctx.require(permissions::PARTY_WRITE), Err(ApiError::Forbidden(_))));
    }
}
