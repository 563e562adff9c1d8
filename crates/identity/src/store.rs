//! Durable mapping of public key to (email, alias).

use crate::error::StoreResult;
use crate::identity::{Identity, IdentityField};
use async_trait::async_trait;

/// Committed identity records.
///
/// Implementations must enforce uniqueness of public key, email and alias
/// themselves; workflow pre-checks are advisory. Connectivity failures are
/// reported as [`StoreError::Unavailable`](crate::StoreError::Unavailable),
/// never as a miss.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn exists_by_public_key(&self, public_key: &str) -> StoreResult<bool>;

    async fn exists_by_alias(&self, alias: &str) -> StoreResult<bool>;

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool>;

    /// Alias of the identity owning `email`, or `NotFound`.
    async fn lookup_alias_by_email(&self, email: &str) -> StoreResult<String>;

    /// `(email, alias)` of the identity owning `public_key`, or `NotFound`.
    async fn lookup_email_and_alias(&self, public_key: &str) -> StoreResult<(String, String)>;

    /// Insert a new identity. A uniqueness violation yields `Conflict`.
    async fn create(&self, identity: &Identity) -> StoreResult<()>;

    /// Replace one field of an existing identity.
    async fn update_field(
        &self,
        public_key: &str,
        field: IdentityField,
        value: &str,
    ) -> StoreResult<()>;
}
