//! Periodic removal of expired pending requests.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use victory_identity::PendingLedger;

/// Purge expired entries every `interval` until the task is aborted.
pub fn spawn_sweeper(ledger: Arc<dyn PendingLedger>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match ledger.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "Purged expired pending requests"),
                Err(e) => warn!(error = %e, "Expiry sweep failed"),
            }
        }
    })
}
