//! SQLite access layer: connection bootstrap and connection providers.
//!
//! # Responsibility
//! - Open and configure SQLite connections for MinOrm core.
//! - Define the connection-acquisition contract repositories run on.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Pool lifecycle belongs to the provider, never to repositories.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
mod provider;

pub use open::{open_db, open_db_in_memory};
pub use provider::{build_pool, ConnectionProvider, PoolSettings, SharedConnection, SqlitePool};

pub type DbResult<T> = Result<T, DbError>;

/// Store-level failure: driver errors plus pool acquisition errors.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Pool(r2d2::Error),
    Unavailable(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Pool(err) => write!(f, "connection pool error: {err}"),
            Self::Unavailable(message) => write!(f, "connection unavailable: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Pool(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<r2d2::Error> for DbError {
    fn from(value: r2d2::Error) -> Self {
        Self::Pool(value)
    }
}
