use std::sync::Arc;

use victory_core::{Clock, SystemClock};
use victory_identity::{
    Database, DomainPolicy, LogNotifier, Notifier, SqliteIdentityStore, SqlitePendingLedger,
    VerificationWorkflow,
};

use crate::config::{MailProvider, ServiceConfig};
use crate::mailer::MailgunNotifier;

pub struct AppState {
    pub config: ServiceConfig,
    pub database: Database,
    pub ledger: SqlitePendingLedger,
    pub workflow: VerificationWorkflow,
}

impl AppState {
    /// Open storage and wire the workflow from validated configuration.
    pub fn new(config: ServiceConfig) -> anyhow::Result<Self> {
        let database = Database::open(&config.storage.database_path)?;
        let notifier: Arc<dyn Notifier> = match config.mail.provider {
            MailProvider::Mailgun => Arc::new(MailgunNotifier::new(
                &config.mail,
                config.workflow().pending_ttl,
            )?),
            MailProvider::Log => Arc::new(LogNotifier),
        };
        Ok(Self::with_parts(config, database, notifier, Arc::new(SystemClock)))
    }

    /// Wire the workflow around an already opened database and gateway.
    pub fn with_parts(
        config: ServiceConfig,
        database: Database,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ledger = SqlitePendingLedger::new(database.clone(), clock.clone());
        let workflow = VerificationWorkflow::new(
            config.workflow(),
            Arc::new(SqliteIdentityStore::new(database.clone())),
            Arc::new(ledger.clone()),
            notifier,
        )
        .with_clock(clock)
        .with_domain_policy(DomainPolicy::new(&config.verification.allowed_domains));

        Self::with_workflow(config, database, ledger, workflow)
    }

    /// Assemble state around a workflow built by the caller.
    pub fn with_workflow(
        config: ServiceConfig,
        database: Database,
        ledger: SqlitePendingLedger,
        workflow: VerificationWorkflow,
    ) -> Self {
        Self {
            config,
            database,
            ledger,
            workflow,
        }
    }
}
