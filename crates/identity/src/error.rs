//! Error types for Victory identity operations.
//!
//! Three layers, each with its own enum: [`StoreError`] at the record store
//! boundary, [`NotifyError`] at the notification gateway, and [`VerifyError`]
//! for the verification workflow that callers see.

use crate::identity::IdentityField;
use thiserror::Error;

/// Attribute whose uniqueness was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictField {
    PublicKey,
    Alias,
    Email,
}

impl std::fmt::Display for ConflictField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConflictField::PublicKey => "public key",
            ConflictField::Alias => "alias",
            ConflictField::Email => "email",
        };
        f.write_str(name)
    }
}

impl From<IdentityField> for ConflictField {
    fn from(field: IdentityField) -> Self {
        match field {
            IdentityField::Alias => ConflictField::Alias,
            IdentityField::Email => ConflictField::Email,
        }
    }
}

/// Errors raised by the identity store and the pending request ledger.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No row matched
    #[error("Record not found")]
    NotFound,

    /// Pending entry existed but its TTL had lapsed
    #[error("Pending entry expired")]
    Expired,

    /// Uniqueness constraint rejected the write
    #[error("Uniqueness violation on {field}")]
    Conflict { field: ConflictField },

    /// Code already belongs to a live pending entry
    #[error("Verification code already in use")]
    CodeCollision,

    /// Storage engine or connectivity failure
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Result type for store and ledger operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a notification gateway.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Could not reach the provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider answered with a non-success status
    #[error("Provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// Dispatch did not finish within the allowed time
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Message body could not be produced
    #[error("Template error: {0}")]
    Template(String),
}

/// Errors returned by the verification workflow.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Request fields failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Subject identity does not exist
    #[error("Identity not found")]
    NotFound,

    /// Code was never issued, already redeemed, or past its TTL
    #[error("Verification code is invalid or has expired")]
    InvalidOrExpiredCode,

    /// Alias, email or public key already taken
    #[error("{field} is already taken")]
    Conflict { field: ConflictField },

    /// Email domain is not on the allow-list
    #[error("Please use a Gmail or Proton Mail domain")]
    UnauthorizedDomain { domain: String },

    /// Mail dispatch failed
    #[error("Notification failed: {0}")]
    NotificationFailed(#[from] NotifyError),

    /// Every generated code collided with a live pending entry
    #[error("Could not allocate a verification code after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },

    /// Infrastructure failure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl VerifyError {
    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            VerifyError::InvalidInput(_) => "invalid_input",
            VerifyError::NotFound => "not_found",
            VerifyError::InvalidOrExpiredCode => "invalid_or_expired_code",
            VerifyError::Conflict { .. } => "conflict",
            VerifyError::UnauthorizedDomain { .. } => "unauthorized_domain",
            VerifyError::NotificationFailed(_) => "notification_failed",
            VerifyError::CodeSpaceExhausted { .. } => "code_space_exhausted",
            VerifyError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<StoreError> for VerifyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => VerifyError::NotFound,
            StoreError::Expired => VerifyError::InvalidOrExpiredCode,
            StoreError::Conflict { field } => VerifyError::Conflict { field },
            StoreError::CodeCollision => VerifyError::CodeSpaceExhausted { attempts: 1 },
            StoreError::Unavailable(msg) => VerifyError::StoreUnavailable(msg),
        }
    }
}

/// Result type for workflow operations.
pub type VerifyResult<T> = Result<T, VerifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_workflow_errors() {
        assert!(matches!(
            VerifyError::from(StoreError::Unavailable("down".into())),
            VerifyError::StoreUnavailable(_)
        ));
        assert!(matches!(
            VerifyError::from(StoreError::Conflict {
                field: ConflictField::Alias
            }),
            VerifyError::Conflict {
                field: ConflictField::Alias
            }
        ));
        assert!(matches!(
            VerifyError::from(StoreError::Expired),
            VerifyError::InvalidOrExpiredCode
        ));
    }

    #[test]
    fn test_conflict_and_expired_are_distinguishable() {
        let conflict = VerifyError::Conflict {
            field: ConflictField::Alias,
        };
        assert_ne!(conflict.kind(), VerifyError::InvalidOrExpiredCode.kind());
        assert_eq!(conflict.to_string(), "alias is already taken");
    }
}
