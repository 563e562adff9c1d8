//! SQLite-backed identity store and pending request ledger.
//!
//! Both live in one database file:
//! - `identities`: committed records, UNIQUE on public key, email and alias
//! - `pending_registrations`: UNIQUE on code, public key, alias and email
//! - `pending_updates`: UNIQUE on code and public key
//!
//! The subject-key constraints on the pending tables make "one live request
//! per subject" a storage guarantee rather than an application convention.
//! Every call runs on the blocking pool so a slow disk never stalls the
//! async executor.

use crate::code::VerificationCode;
use crate::error::{ConflictField, StoreError, StoreResult};
use crate::identity::{Identity, IdentityField};
use crate::pending::{PendingLedger, PendingRegistration, PendingUpdate, RegistrationSubject};
use crate::store::IdentityStore;
use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};
use victory_core::Clock;

/// Shared handle to the SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Create or open a database file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening identity database");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            }
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::from_connection(conn)
    }

    /// Private in-memory database, used by tests and throwaway runs.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn init_schema(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS identities (
                public_key TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                alias TEXT NOT NULL UNIQUE,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS pending_registrations (
                code INTEGER PRIMARY KEY,
                public_key TEXT NOT NULL UNIQUE,
                alias TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                expires_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS pending_updates (
                code INTEGER PRIMARY KEY,
                public_key TEXT NOT NULL UNIQUE,
                is_alias INTEGER NOT NULL,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_pending_registrations_expiry
                ON pending_registrations(expires_at);
            CREATE INDEX IF NOT EXISTS idx_pending_updates_expiry
                ON pending_updates(expires_at);
            "#,
        )?;
        Ok(())
    }

    /// Run `f` against the connection on the blocking thread pool.
    async fn call<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> StoreResult<()> {
        self.call(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }
}

/// Translate a write failure, surfacing uniqueness violations as `Conflict`.
fn map_write_error(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
        if failure.code == rusqlite::ErrorCode::ConstraintViolation {
            let message = message.as_deref().unwrap_or_default();
            let field = if message.ends_with(".email") {
                ConflictField::Email
            } else if message.ends_with(".alias") {
                ConflictField::Alias
            } else {
                ConflictField::PublicKey
            };
            return StoreError::Conflict { field };
        }
    }
    StoreError::from(err)
}

/// Identity records in SQLite.
#[derive(Debug, Clone)]
pub struct SqliteIdentityStore {
    db: Database,
}

impl SqliteIdentityStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn exists(&self, column: &'static str, value: &str) -> StoreResult<bool> {
        let value = value.to_string();
        self.db
            .call(move |conn| {
                let sql = format!(
                    "SELECT EXISTS(SELECT 1 FROM identities WHERE {} = ?1)",
                    column
                );
                Ok(conn.query_row(&sql, params![value], |row| row.get::<_, bool>(0))?)
            })
            .await
    }

    /// Full record for `public_key`.
    pub async fn get(&self, public_key: &str) -> StoreResult<Identity> {
        let public_key = public_key.to_string();
        self.db
            .call(move |conn| {
                conn.query_row(
                    "SELECT public_key, email, alias, created_at FROM identities WHERE public_key = ?1",
                    params![public_key],
                    |row| {
                        Ok(Identity {
                            public_key: row.get(0)?,
                            email: row.get(1)?,
                            alias: row.get(2)?,
                            created_at: row.get::<_, i64>(3)? as u64,
                        })
                    },
                )
                .optional()?
                .ok_or(StoreError::NotFound)
            })
            .await
    }
}

#[async_trait]
impl IdentityStore for SqliteIdentityStore {
    async fn exists_by_public_key(&self, public_key: &str) -> StoreResult<bool> {
        self.exists("public_key", public_key).await
    }

    async fn exists_by_alias(&self, alias: &str) -> StoreResult<bool> {
        self.exists("alias", alias).await
    }

    async fn exists_by_email(&self, email: &str) -> StoreResult<bool> {
        self.exists("email", email).await
    }

    async fn lookup_alias_by_email(&self, email: &str) -> StoreResult<String> {
        let email = email.to_string();
        self.db
            .call(move |conn| {
                conn.query_row(
                    "SELECT alias FROM identities WHERE email = ?1",
                    params![email],
                    |row| row.get::<_, String>(0),
                )
                .optional()?
                .ok_or(StoreError::NotFound)
            })
            .await
    }

    async fn lookup_email_and_alias(&self, public_key: &str) -> StoreResult<(String, String)> {
        let public_key = public_key.to_string();
        self.db
            .call(move |conn| {
                conn.query_row(
                    "SELECT email, alias FROM identities WHERE public_key = ?1",
                    params![public_key],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
                )
                .optional()?
                .ok_or(StoreError::NotFound)
            })
            .await
    }

    async fn create(&self, identity: &Identity) -> StoreResult<()> {
        let identity = identity.clone();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO identities (public_key, email, alias, created_at) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        identity.public_key,
                        identity.email,
                        identity.alias,
                        identity.created_at as i64,
                    ],
                )
                .map_err(map_write_error)?;
                Ok(())
            })
            .await
    }

    async fn update_field(
        &self,
        public_key: &str,
        field: IdentityField,
        value: &str,
    ) -> StoreResult<()> {
        let public_key = public_key.to_string();
        let value = value.to_string();
        self.db
            .call(move |conn| {
                let sql = format!(
                    "UPDATE identities SET {} = ?1 WHERE public_key = ?2",
                    field.column()
                );
                let changed = conn
                    .execute(&sql, params![value, public_key])
                    .map_err(map_write_error)?;
                if changed == 0 {
                    return Err(StoreError::NotFound);
                }
                Ok(())
            })
            .await
    }
}

/// Pending registrations and updates in SQLite.
#[derive(Clone)]
pub struct SqlitePendingLedger {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl SqlitePendingLedger {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    fn expiry(&self, ttl: Duration) -> (u64, u64) {
        let now = self.clock.now_ms();
        (now, now.saturating_add(ttl.as_millis() as u64))
    }

    /// Live `(registrations, updates)` counts.
    pub async fn live_counts(&self) -> StoreResult<(usize, usize)> {
        let now = self.clock.now_ms() as i64;
        self.db
            .call(move |conn| {
                let registrations = conn.query_row(
                    "SELECT COUNT(*) FROM pending_registrations WHERE expires_at > ?1",
                    params![now],
                    |row| row.get::<_, i64>(0),
                )?;
                let updates = conn.query_row(
                    "SELECT COUNT(*) FROM pending_updates WHERE expires_at > ?1",
                    params![now],
                    |row| row.get::<_, i64>(0),
                )?;
                Ok((registrations as usize, updates as usize))
            })
            .await
    }
}

#[async_trait]
impl PendingLedger for SqlitePendingLedger {
    async fn supersede_registration(&self, subject: &RegistrationSubject) -> StoreResult<usize> {
        let column = subject.column();
        let value = subject.value().to_string();
        let removed = self
            .db
            .call(move |conn| {
                let sql = format!("DELETE FROM pending_registrations WHERE {} = ?1", column);
                Ok(conn.execute(&sql, params![value])?)
            })
            .await?;
        if removed > 0 {
            debug!(subject = column, removed, "Superseded pending registration");
        }
        Ok(removed)
    }

    async fn put_registration(
        &self,
        code: VerificationCode,
        request: &PendingRegistration,
        ttl: Duration,
    ) -> StoreResult<u64> {
        let (now, expires_at) = self.expiry(ttl);
        let request = request.clone();
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                // Reclaim the code if it only belongs to an expired entry
                tx.execute(
                    "DELETE FROM pending_registrations WHERE code = ?1 AND expires_at <= ?2",
                    params![code.value(), now as i64],
                )?;
                tx.execute(
                    "DELETE FROM pending_registrations WHERE public_key = ?1 OR alias = ?2 OR email = ?3",
                    params![request.public_key, request.alias, request.email],
                )?;
                let inserted = tx.execute(
                    "INSERT OR IGNORE INTO pending_registrations (code, public_key, alias, email, expires_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        code.value(),
                        request.public_key,
                        request.alias,
                        request.email,
                        expires_at as i64,
                    ],
                )?;
                if inserted == 0 {
                    return Err(StoreError::CodeCollision);
                }
                tx.commit()?;
                Ok(expires_at)
            })
            .await
    }

    async fn redeem_registration(
        &self,
        code: VerificationCode,
    ) -> StoreResult<PendingRegistration> {
        let now = self.clock.now_ms();
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let row = tx
                    .query_row(
                        "SELECT public_key, alias, email, expires_at FROM pending_registrations WHERE code = ?1",
                        params![code.value()],
                        |row| {
                            Ok((
                                PendingRegistration {
                                    public_key: row.get(0)?,
                                    alias: row.get(1)?,
                                    email: row.get(2)?,
                                },
                                row.get::<_, i64>(3)? as u64,
                            ))
                        },
                    )
                    .optional()?;
                let Some((request, expires_at)) = row else {
                    return Err(StoreError::NotFound);
                };
                tx.execute(
                    "DELETE FROM pending_registrations WHERE code = ?1",
                    params![code.value()],
                )?;
                tx.commit()?;
                if expires_at <= now {
                    return Err(StoreError::Expired);
                }
                Ok(request)
            })
            .await
    }

    async fn supersede_update(&self, public_key: &str) -> StoreResult<usize> {
        let public_key = public_key.to_string();
        let removed = self
            .db
            .call(move |conn| {
                Ok(conn.execute(
                    "DELETE FROM pending_updates WHERE public_key = ?1",
                    params![public_key],
                )?)
            })
            .await?;
        if removed > 0 {
            debug!(removed, "Superseded pending update");
        }
        Ok(removed)
    }

    async fn put_update(
        &self,
        code: VerificationCode,
        request: &PendingUpdate,
        ttl: Duration,
    ) -> StoreResult<u64> {
        let (now, expires_at) = self.expiry(ttl);
        let request = request.clone();
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    "DELETE FROM pending_updates WHERE code = ?1 AND expires_at <= ?2",
                    params![code.value(), now as i64],
                )?;
                tx.execute(
                    "DELETE FROM pending_updates WHERE public_key = ?1",
                    params![request.public_key],
                )?;
                let inserted = tx.execute(
                    "INSERT OR IGNORE INTO pending_updates (code, public_key, is_alias, value, expires_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        code.value(),
                        request.public_key,
                        request.field.is_alias(),
                        request.value,
                        expires_at as i64,
                    ],
                )?;
                if inserted == 0 {
                    return Err(StoreError::CodeCollision);
                }
                tx.commit()?;
                Ok(expires_at)
            })
            .await
    }

    async fn redeem_update(&self, code: VerificationCode) -> StoreResult<PendingUpdate> {
        let now = self.clock.now_ms();
        self.db
            .call(move |conn| {
                let tx = conn.transaction()?;
                let row = tx
                    .query_row(
                        "SELECT public_key, is_alias, value, expires_at FROM pending_updates WHERE code = ?1",
                        params![code.value()],
                        |row| {
                            Ok((
                                PendingUpdate {
                                    public_key: row.get(0)?,
                                    field: IdentityField::from_is_alias(row.get::<_, bool>(1)?),
                                    value: row.get(2)?,
                                },
                                row.get::<_, i64>(3)? as u64,
                            ))
                        },
                    )
                    .optional()?;
                let Some((request, expires_at)) = row else {
                    return Err(StoreError::NotFound);
                };
                tx.execute(
                    "DELETE FROM pending_updates WHERE code = ?1",
                    params![code.value()],
                )?;
                tx.commit()?;
                if expires_at <= now {
                    return Err(StoreError::Expired);
                }
                Ok(request)
            })
            .await
    }

    async fn purge_expired(&self) -> StoreResult<usize> {
        let now = self.clock.now_ms() as i64;
        self.db
            .call(move |conn| {
                let registrations = conn.execute(
                    "DELETE FROM pending_registrations WHERE expires_at <= ?1",
                    params![now],
                )?;
                let updates = conn.execute(
                    "DELETE FROM pending_updates WHERE expires_at <= ?1",
                    params![now],
                )?;
                Ok(registrations + updates)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use victory_core::ManualClock;

    const TTL: Duration = Duration::from_secs(900);

    fn code(value: u16) -> VerificationCode {
        VerificationCode::new(value).unwrap()
    }

    fn registration(public_key: &str, alias: &str, email: &str) -> PendingRegistration {
        PendingRegistration {
            public_key: public_key.to_string(),
            alias: alias.to_string(),
            email: email.to_string(),
        }
    }

    fn identity(public_key: &str, alias: &str, email: &str) -> Identity {
        Identity {
            public_key: public_key.to_string(),
            email: email.to_string(),
            alias: alias.to_string(),
            created_at: 1_700_000_000_000,
        }
    }

    fn setup() -> (SqliteIdentityStore, SqlitePendingLedger, ManualClock) {
        let db = Database::open_in_memory().unwrap();
        let clock = ManualClock::new(1_700_000_000_000);
        let ledger = SqlitePendingLedger::new(db.clone(), Arc::new(clock.clone()));
        (SqliteIdentityStore::new(db), ledger, clock)
    }

    #[tokio::test]
    async fn test_create_and_lookup_identity() {
        let (store, _, _) = setup();
        store.create(&identity("abc", "nova", "nova@gmail.com")).await.unwrap();

        assert!(store.exists_by_public_key("abc").await.unwrap());
        assert!(store.exists_by_alias("nova").await.unwrap());
        assert!(store.exists_by_email("nova@gmail.com").await.unwrap());
        assert!(!store.exists_by_alias("other").await.unwrap());
        assert_eq!(store.lookup_alias_by_email("nova@gmail.com").await.unwrap(), "nova");
        assert_eq!(
            store.lookup_email_and_alias("abc").await.unwrap(),
            ("nova@gmail.com".to_string(), "nova".to_string())
        );
        assert_eq!(store.get("abc").await.unwrap().created_at, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_lookups_report_not_found() {
        let (store, _, _) = setup();
        assert!(matches!(
            store.lookup_alias_by_email("ghost@gmail.com").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.lookup_email_and_alias("ghost").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates_per_field() {
        let (store, _, _) = setup();
        store.create(&identity("abc", "nova", "nova@gmail.com")).await.unwrap();

        let cases = [
            (identity("abc", "x", "x@gmail.com"), ConflictField::PublicKey),
            (identity("def", "nova", "y@gmail.com"), ConflictField::Alias),
            (identity("ghi", "z", "nova@gmail.com"), ConflictField::Email),
        ];
        for (candidate, expected) in cases {
            match store.create(&candidate).await {
                Err(StoreError::Conflict { field }) => assert_eq!(field, expected),
                other => panic!("expected conflict on {:?}, got {:?}", expected, other),
            }
        }
    }

    #[tokio::test]
    async fn test_update_field() {
        let (store, _, _) = setup();
        store.create(&identity("abc", "nova", "nova@gmail.com")).await.unwrap();
        store.create(&identity("def", "luna", "luna@gmail.com")).await.unwrap();

        store.update_field("abc", IdentityField::Alias, "nova2").await.unwrap();
        assert_eq!(
            store.lookup_email_and_alias("abc").await.unwrap(),
            ("nova@gmail.com".to_string(), "nova2".to_string())
        );

        assert!(matches!(
            store.update_field("abc", IdentityField::Email, "luna@gmail.com").await,
            Err(StoreError::Conflict {
                field: ConflictField::Email
            })
        ));
        assert!(matches!(
            store.update_field("ghost", IdentityField::Alias, "x").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_registration_put_and_redeem_once() {
        let (_, ledger, _) = setup();
        let request = registration("abc", "nova", "nova@gmail.com");

        let expires_at = ledger.put_registration(code(4821), &request, TTL).await.unwrap();
        assert_eq!(expires_at, 1_700_000_000_000 + 900_000);

        assert_eq!(ledger.redeem_registration(code(4821)).await.unwrap(), request);
        assert!(matches!(
            ledger.redeem_registration(code(4821)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_registration_expires() {
        let (_, ledger, clock) = setup();
        ledger
            .put_registration(code(1), &registration("abc", "nova", "nova@gmail.com"), TTL)
            .await
            .unwrap();

        clock.advance(TTL);
        assert!(matches!(
            ledger.redeem_registration(code(1)).await,
            Err(StoreError::Expired)
        ));
        // Expired entries are consumed by the failed redemption
        assert!(matches!(
            ledger.redeem_registration(code(1)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_put_replaces_entries_sharing_a_subject() {
        let (_, ledger, _) = setup();
        ledger
            .put_registration(code(1), &registration("a", "nova", "first@gmail.com"), TTL)
            .await
            .unwrap();
        ledger
            .put_registration(code(2), &registration("b", "luna", "second@gmail.com"), TTL)
            .await
            .unwrap();

        // Collides with the first on alias and the second on email
        ledger
            .put_registration(code(3), &registration("c", "nova", "second@gmail.com"), TTL)
            .await
            .unwrap();

        assert_eq!(ledger.live_counts().await.unwrap(), (1, 0));
        assert!(ledger.redeem_registration(code(1)).await.is_err());
        assert!(ledger.redeem_registration(code(2)).await.is_err());
        assert!(ledger.redeem_registration(code(3)).await.is_ok());
    }

    #[tokio::test]
    async fn test_live_code_is_never_overwritten() {
        let (_, ledger, clock) = setup();
        let first = registration("a", "nova", "nova@gmail.com");
        ledger.put_registration(code(77), &first, TTL).await.unwrap();

        let second = registration("b", "luna", "luna@gmail.com");
        assert!(matches!(
            ledger.put_registration(code(77), &second, TTL).await,
            Err(StoreError::CodeCollision)
        ));
        assert_eq!(ledger.redeem_registration(code(77)).await.unwrap(), first);

        // Once the holder has expired the code can be reused
        ledger.put_registration(code(78), &first, TTL).await.unwrap();
        clock.advance(TTL + Duration::from_secs(1));
        ledger.put_registration(code(78), &second, TTL).await.unwrap();
        assert_eq!(ledger.redeem_registration(code(78)).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_supersede_registration_by_subject() {
        let (_, ledger, _) = setup();
        ledger
            .put_registration(code(5), &registration("a", "nova", "nova@gmail.com"), TTL)
            .await
            .unwrap();

        let removed = ledger
            .supersede_registration(&RegistrationSubject::Email("other@gmail.com".into()))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        let removed = ledger
            .supersede_registration(&RegistrationSubject::Alias("nova".into()))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(ledger.redeem_registration(code(5)).await.is_err());
    }

    #[tokio::test]
    async fn test_update_lifecycle() {
        let (_, ledger, _) = setup();
        let first = PendingUpdate {
            public_key: "abc".into(),
            field: IdentityField::Alias,
            value: "nova2".into(),
        };
        let second = PendingUpdate {
            public_key: "abc".into(),
            field: IdentityField::Email,
            value: "nova2@gmail.com".into(),
        };

        ledger.put_update(code(10), &first, TTL).await.unwrap();
        ledger.put_update(code(11), &second, TTL).await.unwrap();
        assert_eq!(ledger.live_counts().await.unwrap(), (0, 1));

        assert!(matches!(
            ledger.redeem_update(code(10)).await,
            Err(StoreError::NotFound)
        ));
        assert_eq!(ledger.redeem_update(code(11)).await.unwrap(), second);

        ledger.put_update(code(12), &first, TTL).await.unwrap();
        assert_eq!(ledger.supersede_update("abc").await.unwrap(), 1);
        assert!(ledger.redeem_update(code(12)).await.is_err());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (_, ledger, clock) = setup();
        ledger
            .put_registration(code(1), &registration("a", "nova", "nova@gmail.com"), TTL)
            .await
            .unwrap();
        let update = PendingUpdate {
            public_key: "b".into(),
            field: IdentityField::Alias,
            value: "luna".into(),
        };
        ledger.put_update(code(2), &update, TTL).await.unwrap();

        assert_eq!(ledger.purge_expired().await.unwrap(), 0);
        clock.advance(TTL);
        assert_eq!(ledger.purge_expired().await.unwrap(), 2);
        assert_eq!(ledger.live_counts().await.unwrap(), (0, 0));
    }

    #[tokio::test]
    async fn test_ping() {
        let db = Database::open_in_memory().unwrap();
        db.ping().await.unwrap();
    }
}
