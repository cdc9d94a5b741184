//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_party::PartyError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_type, message, details) = match self {
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized => ("unauthorized", "Unauthorized".to_string(), None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                ("internal_error", msg, None)
            }
            ApiError::ServiceUnavailable(msg) => ("service_unavailable", msg, None),
            ApiError::Validation(errors) => (
                "validation_error",
                "Validation failed".to_string(),
                Some(errors),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PartyError> for ApiError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::PartyNotFound(_)
            | PartyError::AssociationNotFound(_)
            | PartyError::MandateNotFound(_)
            | PartyError::ReferenceDataNotFound(_) => ApiError::NotFound(err.to_string()),
            PartyError::DuplicateParty(_)
            | PartyError::DuplicateAssociation(_)
            | PartyError::DuplicateMandate(_) => ApiError::Conflict(err.to_string()),
            PartyError::WrongPartyType { .. } | PartyError::InvalidData(_) => {
                ApiError::BadRequest(err.to_string())
            }
            PartyError::ValidationFailed(errors) => ApiError::Validation(errors),
            PartyError::ServiceUnavailable(msg) => ApiError::ServiceUnavailable(msg),
            PartyError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_party::PartyType;

    #[test]
    fn test_party_errors_map_to_status_codes() {
        let cases = [
            (PartyError::not_found("PTY-1"), StatusCode::NOT_FOUND),
            (PartyError::DuplicateMandate("MDT-1".into()), StatusCode::CONFLICT),
            (
                PartyError::WrongPartyType {
                    id: "PTY-1".into(),
                    expected: PartyType::Person,
                    actual: PartyType::Organization,
                },
                StatusCode::BAD_REQUEST,
            ),
            (PartyError::validation_failed(vec!["x".into()]), StatusCode::UNPROCESSABLE_ENTITY),
            (PartyError::ServiceUnavailable("down".into()), StatusCode::SERVICE_UNAVAILABLE),
            (PartyError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (party_error, status) in cases {
            assert_eq!(ApiError::from(party_error).status(), status);
        }
    }

    #[test]
    fn test_validation_keeps_every_message() {
        let error = ApiError::from(PartyError::validation_failed(vec!["a".into(), "b".into()]));
        assert!(matches!(error, ApiError::Validation(ref errors) if errors.len() == 2));
    }
}
