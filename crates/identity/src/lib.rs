//! Email-verified identities for Victory.
//!
//! Links an opaque public key to a verified email address and alias, and lets
//! either attribute change later, but only after the requester proves control
//! of the mailbox with a short one-time code.
//!
//! # Core Concepts
//!
//! - **Identity**: the committed `(public_key, email, alias)` record
//! - **Pending request**: a time-bounded, single-use registration or update
//!   awaiting its code
//! - **Code**: four digit token that gates redemption and keys the pending entry
//! - **Supersede**: a newer submission for the same subject replaces the old one
//!
//! # Components
//!
//! - [`IdentityStore`] and [`PendingLedger`]: storage seams, with SQLite
//!   implementations in [`sqlite`]
//! - [`CodeGenerator`]: code source, [`RandomCodeGenerator`] by default
//! - [`DomainPolicy`]: allow-list of mailbox providers
//! - [`Notifier`]: outbound mail gateway
//! - [`VerificationWorkflow`]: the four operations and two queries exposed to
//!   the transport layer

pub mod code;
pub mod domain_policy;
pub mod error;
pub mod identity;
pub mod notify;
pub mod pending;
pub mod sqlite;
pub mod store;
pub mod workflow;

pub use code::{CodeGenerator, InvalidCode, RandomCodeGenerator, VerificationCode, CODE_SPACE};
pub use domain_policy::{DomainPolicy, DEFAULT_ALLOWED_DOMAINS};
pub use error::{
    ConflictField, NotifyError, StoreError, StoreResult, VerifyError, VerifyResult,
};
pub use identity::{Identity, IdentityField};
pub use notify::{CodeNotification, LogNotifier, Notifier, RequestKind};
pub use pending::{PendingLedger, PendingRegistration, PendingUpdate, RegistrationSubject};
pub use sqlite::{Database, SqliteIdentityStore, SqlitePendingLedger};
pub use store::IdentityStore;
pub use workflow::{
    AppliedUpdate, RegistrationRequest, SubmissionReceipt, UpdateRequest, VerificationWorkflow,
    WorkflowConfig,
};
