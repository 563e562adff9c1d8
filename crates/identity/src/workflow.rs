//! Verification workflow: submit a change, mail a code, redeem the code.
//!
//! # State Transitions
//!
//! ```text
//! registration:  None → Pending → Verified   (identity created)
//!                         ↓
//!                      Expired               (no side effect)
//!
//! update:        None → Pending → Applied    (one field replaced)
//!                         ↓
//!                      Expired
//! ```
//!
//! A newer submission for the same subject supersedes the pending one. The
//! pending entry is written before the domain check and the mail dispatch and
//! is left in place if either fails; it expires on its own.

use crate::code::{CodeGenerator, RandomCodeGenerator, VerificationCode};
use crate::domain_policy::DomainPolicy;
use crate::error::{ConflictField, NotifyError, StoreError, VerifyError, VerifyResult};
use crate::identity::{
    normalize, normalize_alias, normalize_email, normalize_public_key, Identity, IdentityField,
};
use crate::notify::{CodeNotification, Notifier, RequestKind};
use crate::pending::{PendingLedger, PendingRegistration, PendingUpdate, RegistrationSubject};
use crate::store::IdentityStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use victory_core::{fingerprint, Clock, SystemClock};

/// Lifetime of a pending request.
pub const DEFAULT_PENDING_TTL: Duration = Duration::from_secs(15 * 60);

/// Upper bound on a single mail dispatch.
pub const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Codes drawn before giving up on a crowded code space.
pub const DEFAULT_MAX_CODE_ATTEMPTS: u32 = 8;

/// Tunables for [`VerificationWorkflow`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowConfig {
    pub pending_ttl: Duration,
    pub notify_timeout: Duration,
    pub max_code_attempts: u32,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            pending_ttl: DEFAULT_PENDING_TTL,
            notify_timeout: DEFAULT_NOTIFY_TIMEOUT,
            max_code_attempts: DEFAULT_MAX_CODE_ATTEMPTS,
        }
    }
}

/// A new identity as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub public_key: String,
    pub alias: String,
    pub email: String,
}

/// A field change as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub public_key: String,
    pub field: IdentityField,
    pub value: String,
}

/// Acknowledgement of a submission. Never carries the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub kind: RequestKind,
    /// When the issued code stops being redeemable (Unix ms)
    pub expires_at: u64,
}

/// A committed field change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedUpdate {
    pub public_key: String,
    pub field: IdentityField,
    pub value: String,
}

/// Orchestrates the identity store, the pending ledger and the mail gateway.
///
/// Holds no mutable state of its own; all coordination goes through the
/// store and ledger, so one instance can serve concurrent requests.
pub struct VerificationWorkflow {
    identities: Arc<dyn IdentityStore>,
    ledger: Arc<dyn PendingLedger>,
    notifier: Arc<dyn Notifier>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    policy: DomainPolicy,
    config: WorkflowConfig,
}

impl VerificationWorkflow {
    pub fn new(
        config: WorkflowConfig,
        identities: Arc<dyn IdentityStore>,
        ledger: Arc<dyn PendingLedger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            identities,
            ledger,
            notifier,
            codes: Arc::new(RandomCodeGenerator),
            clock: Arc::new(SystemClock),
            policy: DomainPolicy::default(),
            config,
        }
    }

    pub fn with_code_generator(mut self, codes: Arc<dyn CodeGenerator>) -> Self {
        self.codes = codes;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_domain_policy(mut self, policy: DomainPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Start a registration: reserve the alias and email under a new code and
    /// mail the code to the proposed address.
    pub async fn submit_registration(
        &self,
        request: RegistrationRequest,
    ) -> VerifyResult<SubmissionReceipt> {
        let public_key = normalize_public_key(&request.public_key)?;
        let alias = normalize_alias(&request.alias)?;
        let email = normalize_email(&request.email)?;
        let email_fp = fingerprint(&email);

        if self.identities.exists_by_alias(&alias).await? {
            debug!(alias = %alias, "Registration rejected, alias taken");
            return Err(VerifyError::Conflict {
                field: ConflictField::Alias,
            });
        }
        if self.identities.exists_by_email(&email).await? {
            debug!(email = %email_fp, "Registration rejected, email taken");
            return Err(VerifyError::Conflict {
                field: ConflictField::Email,
            });
        }

        self.ledger
            .supersede_registration(&RegistrationSubject::Alias(alias.clone()))
            .await?;
        self.ledger
            .supersede_registration(&RegistrationSubject::Email(email.clone()))
            .await?;

        let pending = PendingRegistration {
            public_key: public_key.clone(),
            alias: alias.clone(),
            email: email.clone(),
        };
        let (code, expires_at) = self
            .issue(|code| self.ledger.put_registration(code, &pending, self.config.pending_ttl))
            .await?;

        info!(
            public_key = %public_key,
            alias = %alias,
            email = %email_fp,
            expires_at,
            "Registration pending"
        );

        self.check_domain(&email)?;
        self.dispatch(CodeNotification {
            to: email,
            display_name: alias,
            code,
            kind: RequestKind::Registration,
        })
        .await?;

        Ok(SubmissionReceipt {
            kind: RequestKind::Registration,
            expires_at,
        })
    }

    /// Redeem a registration code, creating the identity.
    ///
    /// The pending entry is consumed before the identity is written; a
    /// failed write leaves the code spent.
    pub async fn redeem_registration(&self, code: VerificationCode) -> VerifyResult<Identity> {
        let pending = self
            .ledger
            .redeem_registration(code)
            .await
            .map_err(code_error)?;

        let identity = Identity {
            public_key: pending.public_key,
            email: pending.email,
            alias: pending.alias,
            created_at: self.clock.now_ms(),
        };
        self.identities.create(&identity).await?;

        info!(
            public_key = %identity.public_key,
            alias = %identity.alias,
            "Registration verified"
        );
        Ok(identity)
    }

    /// Start an update: mail a code to the identity's current address.
    pub async fn submit_update(&self, request: UpdateRequest) -> VerifyResult<SubmissionReceipt> {
        let public_key = normalize_public_key(&request.public_key)?;
        let value = match request.field {
            IdentityField::Alias => normalize_alias(&request.value)?,
            IdentityField::Email => normalize_email(&request.value)?,
        };

        self.ledger.supersede_update(&public_key).await?;

        let (email, alias) = self.identities.lookup_email_and_alias(&public_key).await?;

        let current = match request.field {
            IdentityField::Alias => &alias,
            IdentityField::Email => &email,
        };
        if *current == value {
            return Err(VerifyError::InvalidInput(format!(
                "{} is already '{}'",
                ConflictField::from(request.field),
                value
            )));
        }

        let taken = match request.field {
            IdentityField::Alias => self.identities.exists_by_alias(&value).await?,
            IdentityField::Email => self.identities.exists_by_email(&value).await?,
        };
        if taken {
            return Err(VerifyError::Conflict {
                field: request.field.into(),
            });
        }

        let pending = PendingUpdate {
            public_key: public_key.clone(),
            field: request.field,
            value,
        };
        let (code, expires_at) = self
            .issue(|code| self.ledger.put_update(code, &pending, self.config.pending_ttl))
            .await?;

        info!(
            public_key = %public_key,
            field = ?request.field,
            expires_at,
            "Update pending"
        );

        self.check_domain(&email)?;
        self.dispatch(CodeNotification {
            to: email,
            display_name: alias,
            code,
            kind: RequestKind::Update,
        })
        .await?;

        Ok(SubmissionReceipt {
            kind: RequestKind::Update,
            expires_at,
        })
    }

    /// Redeem an update code, replacing the pending field on the identity.
    pub async fn redeem_update(&self, code: VerificationCode) -> VerifyResult<AppliedUpdate> {
        let pending = self.ledger.redeem_update(code).await.map_err(code_error)?;

        self.identities
            .update_field(&pending.public_key, pending.field, &pending.value)
            .await?;

        info!(
            public_key = %pending.public_key,
            field = ?pending.field,
            "Update applied"
        );
        Ok(AppliedUpdate {
            public_key: pending.public_key,
            field: pending.field,
            value: pending.value,
        })
    }

    /// Whether an identity exists for `public_key`.
    pub async fn check_public_key_registered(&self, public_key: &str) -> VerifyResult<bool> {
        Ok(self
            .identities
            .exists_by_public_key(public_key.trim())
            .await?)
    }

    /// Alias of the identity owning `email`.
    pub async fn lookup_alias_by_email(&self, email: &str) -> VerifyResult<String> {
        Ok(self.identities.lookup_alias_by_email(&normalize(email)).await?)
    }

    /// Draw codes until the ledger accepts one.
    async fn issue<F, Fut>(&self, mut put: F) -> VerifyResult<(VerificationCode, u64)>
    where
        F: FnMut(VerificationCode) -> Fut,
        Fut: std::future::Future<Output = Result<u64, StoreError>>,
    {
        let attempts = self.config.max_code_attempts.max(1);
        for attempt in 1..=attempts {
            let code = self.codes.issue();
            match put(code).await {
                Ok(expires_at) => return Ok((code, expires_at)),
                Err(StoreError::CodeCollision) => {
                    debug!(attempt, "Verification code collided, drawing another");
                }
                Err(e) => return Err(e.into()),
            }
        }
        warn!(attempts, "Verification code space exhausted");
        Err(VerifyError::CodeSpaceExhausted { attempts })
    }

    fn check_domain(&self, email: &str) -> VerifyResult<()> {
        if self.policy.is_allowed(email) {
            return Ok(());
        }
        let domain = DomainPolicy::domain_of(email).to_string();
        warn!(domain = %domain, "Email domain not allowed, pending entry left to expire");
        Err(VerifyError::UnauthorizedDomain { domain })
    }

    async fn dispatch(&self, notification: CodeNotification) -> VerifyResult<()> {
        let timeout = self.config.notify_timeout;
        match tokio::time::timeout(timeout, self.notifier.send(&notification)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                warn!(
                    to = %fingerprint(&notification.to),
                    kind = notification.kind.as_str(),
                    error = %e,
                    "Verification mail failed"
                );
                Err(e.into())
            }
            Err(_) => {
                warn!(
                    to = %fingerprint(&notification.to),
                    kind = notification.kind.as_str(),
                    ?timeout,
                    "Verification mail timed out"
                );
                Err(NotifyError::Timeout(timeout).into())
            }
        }
    }
}

/// Missing and expired codes look the same to callers.
fn code_error(err: StoreError) -> VerifyError {
    match err {
        StoreError::NotFound | StoreError::Expired => VerifyError::InvalidOrExpiredCode,
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkflowConfig::default();
        assert_eq!(config.pending_ttl, Duration::from_secs(900));
        assert_eq!(config.notify_timeout, Duration::from_secs(10));
        assert_eq!(config.max_code_attempts, 8);
    }

    #[test]
    fn test_code_error_collapses_missing_and_expired() {
        assert!(matches!(
            code_error(StoreError::NotFound),
            VerifyError::InvalidOrExpiredCode
        ));
        assert!(matches!(
            code_error(StoreError::Expired),
            VerifyError::InvalidOrExpiredCode
        ));
        assert!(matches!(
            code_error(StoreError::Unavailable("io".into())),
            VerifyError::StoreUnavailable(_)
        ));
    }
}
