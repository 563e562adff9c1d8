//! Time-bounded pending requests awaiting code redemption.
//!
//! Two independent collections live in the ledger: registrations (a proposed
//! new identity) and updates (a proposed change to one field of an existing
//! identity). Both are keyed by verification code and carry an absolute
//! expiry; an expired entry is indistinguishable from a missing one at the
//! workflow boundary.

use crate::code::VerificationCode;
use crate::error::StoreResult;
use crate::identity::IdentityField;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Proposed identity awaiting verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub public_key: String,
    pub alias: String,
    pub email: String,
}

/// Proposed change to one field of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub public_key: String,
    pub field: IdentityField,
    pub value: String,
}

/// Attribute a pending registration can be superseded by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationSubject {
    Alias(String),
    Email(String),
}

impl RegistrationSubject {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            RegistrationSubject::Alias(_) => "alias",
            RegistrationSubject::Email(_) => "email",
        }
    }

    pub(crate) fn value(&self) -> &str {
        match self {
            RegistrationSubject::Alias(v) | RegistrationSubject::Email(v) => v,
        }
    }
}

/// Ledger of pending registration and update requests.
///
/// `put_*` replaces any live entry sharing a subject key with the new one in
/// a single step, so at most one live entry exists per subject. A code held
/// by another live entry is never overwritten: `put_*` fails with
/// `CodeCollision` and the caller draws a new code.
#[async_trait]
pub trait PendingLedger: Send + Sync {
    /// Delete live registrations matching `subject`. Returns the number removed.
    async fn supersede_registration(&self, subject: &RegistrationSubject) -> StoreResult<usize>;

    /// Insert a registration expiring `ttl` from now. Returns the expiry (Unix ms).
    async fn put_registration(
        &self,
        code: VerificationCode,
        request: &PendingRegistration,
        ttl: Duration,
    ) -> StoreResult<u64>;

    /// Remove and return the registration for `code`.
    /// Fails with `NotFound` or `Expired`.
    async fn redeem_registration(&self, code: VerificationCode)
        -> StoreResult<PendingRegistration>;

    /// Delete any live update for `public_key`. Returns the number removed.
    async fn supersede_update(&self, public_key: &str) -> StoreResult<usize>;

    /// Insert an update expiring `ttl` from now. Returns the expiry (Unix ms).
    async fn put_update(
        &self,
        code: VerificationCode,
        request: &PendingUpdate,
        ttl: Duration,
    ) -> StoreResult<u64>;

    /// Remove and return the update for `code`.
    async fn redeem_update(&self, code: VerificationCode) -> StoreResult<PendingUpdate>;

    /// Drop every expired entry of both kinds. Returns the number removed.
    async fn purge_expired(&self) -> StoreResult<usize>;
}
