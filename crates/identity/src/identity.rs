//! Committed identity records and field normalization.

use crate::error::{VerifyError, VerifyResult};
use serde::{Deserialize, Serialize};

/// A verified binding of a public key to an email address and alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque public key, primary key of the record
    pub public_key: String,
    /// Verified mailbox, unique across identities
    pub email: String,
    /// Human-readable handle, unique across identities
    pub alias: String,
    /// Commit time (Unix milliseconds)
    pub created_at: u64,
}

/// Mutable attribute of an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityField {
    Alias,
    Email,
}

impl IdentityField {
    /// Map the wire-level `isAlias` flag onto a field.
    pub fn from_is_alias(is_alias: bool) -> Self {
        if is_alias {
            IdentityField::Alias
        } else {
            IdentityField::Email
        }
    }

    pub fn is_alias(self) -> bool {
        matches!(self, IdentityField::Alias)
    }

    /// Column name in the identity table.
    pub(crate) fn column(self) -> &'static str {
        match self {
            IdentityField::Alias => "alias",
            IdentityField::Email => "email",
        }
    }
}

/// Case-fold and trim an alias or email.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Normalize an alias, rejecting empty values.
pub fn normalize_alias(alias: &str) -> VerifyResult<String> {
    let alias = normalize(alias);
    if alias.is_empty() {
        return Err(VerifyError::InvalidInput("alias cannot be empty".to_string()));
    }
    Ok(alias)
}

/// Normalize an email, rejecting values without a mailbox and a domain.
pub fn normalize_email(email: &str) -> VerifyResult<String> {
    let email = normalize(email);
    match email.rsplit_once('@') {
        Some((mailbox, domain)) if !mailbox.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(VerifyError::InvalidInput(format!(
            "'{}' is not an email address",
            email
        ))),
    }
}

/// Trim a public key, rejecting empty values. Keys are opaque and keep their case.
pub fn normalize_public_key(public_key: &str) -> VerifyResult<String> {
    let public_key = public_key.trim();
    if public_key.is_empty() {
        return Err(VerifyError::InvalidInput(
            "public key cannot be empty".to_string(),
        ));
    }
    Ok(public_key.to_string())
}
