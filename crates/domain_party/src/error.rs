//! Party domain errors
//!
//! This module defines the error types surfaced by the party service:
//! duplicate keys, missing records, validation failures and an unavailable
//! backing store.

use std::fmt;

use thiserror::Error;

use core_kernel::PortError;

use crate::party::PartyType;

/// Errors that can occur in the party domain
#[derive(Debug, Error)]
pub enum PartyError {
    /// Party with the given ID was not found
    #[error("Party not found: {0}")]
    PartyNotFound(String),

    /// Attempted to create a party that already exists
    #[error("Duplicate party: {0}")]
    DuplicateParty(String),

    /// Association with the given ID was not found
    #[error("Association not found: {0}")]
    AssociationNotFound(String),

    /// An association with the same parties and type already exists
    #[error("Duplicate association: {0}")]
    DuplicateAssociation(String),

    /// Mandate with the given ID was not found
    #[error("Mandate not found: {0}")]
    MandateNotFound(String),

    /// Attempted to create a mandate that already exists
    #[error("Duplicate mandate: {0}")]
    DuplicateMandate(String),

    /// Reference-data item was not found
    #[error("Reference data not found: {0}")]
    ReferenceDataNotFound(String),

    /// Operation addressed a party of the other type
    #[error("Expected a {expected} party but {id} is a {actual} party")]
    WrongPartyType {
        id: String,
        expected: PartyType,
        actual: PartyType,
    },

    /// Party validation failed
    #[error("Validation failed: {}", .0.join("; "))]
    ValidationFailed(Vec<String>),

    /// Invalid data provided
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The backing store cannot serve the request right now
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Unexpected failure in an adapter
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The aggregate a port failure relates to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Party,
    Association,
    Mandate,
    ReferenceData,
    Snapshot,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Party => "Party",
            EntityKind::Association => "Association",
            EntityKind::Mandate => "Mandate",
            EntityKind::ReferenceData => "ReferenceData",
            EntityKind::Snapshot => "Snapshot",
        };
        f.write_str(name)
    }
}

impl PartyError {
    /// Creates a PartyNotFound error from any ID type
    pub fn not_found(id: impl fmt::Display) -> Self {
        PartyError::PartyNotFound(id.to_string())
    }

    /// Creates an InvalidData error with a message
    pub fn invalid(message: impl Into<String>) -> Self {
        PartyError::InvalidData(message.into())
    }

    /// Creates a ValidationFailed error from validation errors
    pub fn validation_failed(errors: Vec<String>) -> Self {
        PartyError::ValidationFailed(errors)
    }

    /// Translates an adapter failure into the domain error for `entity`
    ///
    /// Not-found and duplicate failures become the entity-specific variant,
    /// transient failures become `ServiceUnavailable`.
    pub fn from_port(error: PortError, entity: EntityKind, id: impl fmt::Display) -> Self {
        let id = id.to_string();
        match error {
            PortError::NotFound { .. } => match entity {
                EntityKind::Party => PartyError::PartyNotFound(id),
                EntityKind::Association => PartyError::AssociationNotFound(id),
                EntityKind::Mandate => PartyError::MandateNotFound(id),
                EntityKind::ReferenceData | EntityKind::Snapshot => {
                    PartyError::ReferenceDataNotFound(id)
                }
            },
            PortError::Duplicate { .. } | PortError::Conflict { .. } => match entity {
                EntityKind::Party => PartyError::DuplicateParty(id),
                EntityKind::Association => PartyError::DuplicateAssociation(id),
                EntityKind::Mandate => PartyError::DuplicateMandate(id),
                EntityKind::ReferenceData | EntityKind::Snapshot => {
                    PartyError::Internal(format!("unexpected conflict on {} {}", entity, id))
                }
            },
            PortError::Validation { message, .. } => PartyError::InvalidData(message),
            PortError::ServiceUnavailable { service } => PartyError::ServiceUnavailable(service),
            PortError::Connection { message, .. } => PartyError::ServiceUnavailable(message),
            PortError::Timeout { operation, duration_ms } => {
                PartyError::ServiceUnavailable(format!("{} timed out after {} ms", operation, duration_ms))
            }
            e => PartyError::Internal(e.to_string()),
        }
    }

    /// Returns true for the not-found family of errors
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PartyError::PartyNotFound(_)
                | PartyError::AssociationNotFound(_)
                | PartyError::MandateNotFound(_)
                | PartyError::ReferenceDataNotFound(_)
        )
    }

    /// Returns true for the duplicate-key family of errors
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            PartyError::DuplicateParty(_)
                | PartyError::DuplicateAssociation(_)
                | PartyError::DuplicateMandate(_)
        )
    }
}
