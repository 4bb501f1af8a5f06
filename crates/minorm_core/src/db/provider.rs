//! Connection-acquisition contract and built-in providers.
//!
//! # Responsibility
//! - Define how repositories acquire short-lived connection handles.
//! - Ship a pooled provider (r2d2) and a single-connection provider.
//!
//! # Invariants
//! - Handles release their connection when dropped, on every exit path.
//! - Pooled connections are configured (WAL, foreign keys, busy timeout)
//!   before first use.

use super::{DbError, DbResult};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Pooled SQLite connections as supplied by r2d2.
pub type SqlitePool = r2d2::Pool<SqliteConnectionManager>;

/// Supplier of short-lived store connections.
///
/// Pooling is the provider's concern; repositories only acquire a handle,
/// run one statement, and let the handle drop.
pub trait ConnectionProvider {
    /// Connection handle; dropping it releases the connection.
    type Conn<'a>: Deref<Target = Connection>
    where
        Self: 'a;

    /// Acquires one connection handle.
    fn connection(&self) -> DbResult<Self::Conn<'_>>;
}

impl ConnectionProvider for SqlitePool {
    type Conn<'a>
        = r2d2::PooledConnection<SqliteConnectionManager>
    where
        Self: 'a;

    fn connection(&self) -> DbResult<Self::Conn<'_>> {
        self.get().map_err(DbError::from)
    }
}

/// Single shared connection behind a mutex.
///
/// Covers in-memory databases and tests, where a pool would hand every
/// caller a different (empty) database.
pub struct SharedConnection {
    conn: Mutex<Connection>,
}

impl SharedConnection {
    /// Wraps an already-bootstrapped connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Opens a fresh in-memory database as a provider.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::new(super::open_db_in_memory()?))
    }
}

impl ConnectionProvider for SharedConnection {
    type Conn<'a>
        = MutexGuard<'a, Connection>
    where
        Self: 'a;

    fn connection(&self) -> DbResult<Self::Conn<'_>> {
        // A poisoned lock only means another thread panicked mid-statement;
        // the connection itself is still usable.
        Ok(self.conn.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// Pool configuration for file-backed databases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolSettings {
    /// Path to the SQLite database file.
    pub path: PathBuf,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// Per-connection busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("minorm.db"),
            max_connections: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Builds a connection pool from settings.
///
/// Every pooled connection is initialized with WAL journal mode, foreign
/// keys on, and the configured busy timeout.
pub fn build_pool(settings: &PoolSettings) -> DbResult<SqlitePool> {
    let busy_timeout = Duration::from_millis(settings.busy_timeout_ms);
    let manager = SqliteConnectionManager::file(&settings.path).with_init(move |conn| {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(busy_timeout)?;
        Ok(())
    });

    r2d2::Pool::builder()
        .max_size(settings.max_connections)
        .build(manager)
        .map_err(DbError::from)
}

#[cfg(test)]
mod tests {
    use super::{ConnectionProvider, PoolSettings, SharedConnection};

    #[test]
    fn shared_connection_serves_statements() {
        let provider = SharedConnection::open_in_memory().unwrap();
        let conn = provider.connection().unwrap();
        let answer: i64 = conn
            .query_row("SELECT 40 + 2", [], |row| row.get(0))
            .unwrap();
        assert_eq!(answer, 42);
    }

    #[test]
    fn pool_settings_default_is_bounded() {
        let settings = PoolSettings::default();
        assert!(settings.max_connections >= 1);
        assert!(settings.busy_timeout_ms > 0);
    }
}
