//! Delivery of verification codes to a mailbox.

use crate::code::VerificationCode;
use crate::error::NotifyError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Why a code is being sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Registration,
    Update,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Registration => "registration",
            RequestKind::Update => "update",
        }
    }
}

/// A code addressed to a mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeNotification {
    /// Destination mailbox
    pub to: String,
    /// Name used in the greeting (the alias)
    pub display_name: String,
    pub code: VerificationCode,
    pub kind: RequestKind,
}

/// Outbound mail gateway.
///
/// The workflow bounds every call with its own timeout; implementations
/// should still set transport-level timeouts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &CodeNotification) -> Result<(), NotifyError>;
}

/// Writes codes to the log instead of sending mail. Local development only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &CodeNotification) -> Result<(), NotifyError> {
        info!(
            to = %victory_core::fingerprint(&notification.to),
            display_name = %notification.display_name,
            code = %notification.code,
            kind = notification.kind.as_str(),
            "Verification code (log notifier)"
        );
        Ok(())
    }
}
