//! Repository contracts, error taxonomy and persistence implementations.
//!
//! # Responsibility
//! - Define the generic persistence contract for mapped entity types.
//! - Unify configuration, filter, mapping and store failures under one
//!   error type callers can match on.
//!
//! # Invariants
//! - Configuration failures surface at repository construction only.
//! - No operation retries; every failure propagates synchronously.
//! - Connections are released on every exit path, including errors.

use crate::db::DbError;
use crate::meta::{CoerceError, ConfigError, Entity, ToValue};
use crate::sql::{FilterError, StatementError};
use std::error::Error;
use std::fmt::{Display, Formatter};

mod registry;
mod sql_repo;

pub use registry::RepositoryRegistry;
pub use sql_repo::SqlRepository;

pub type RepoResult<T> = Result<T, RepoError>;

/// A result row could not be converted into an entity instance.
///
/// One bad row aborts the whole read; there are no partial results.
#[derive(Debug)]
pub enum MappingError {
    /// The result row carries no column of the mapped name.
    MissingColumn {
        table: String,
        column: &'static str,
    },
    /// The column value cannot represent the declared field type.
    Incompatible {
        column: &'static str,
        field: &'static str,
        cause: CoerceError,
    },
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingColumn { table, column } => {
                write!(f, "result row from `{table}` has no column `{column}`")
            }
            Self::Incompatible {
                column,
                field,
                cause,
            } => write!(f, "column `{column}` does not fit field `{field}`: {cause}"),
        }
    }
}

impl Error for MappingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingColumn { .. } => None,
            Self::Incompatible { cause, .. } => Some(cause),
        }
    }
}

/// Repository error taxonomy.
///
/// `Db` wraps store failures opaquely; the cause stays reachable through
/// `source()` for diagnostics but is not locally recoverable.
#[derive(Debug)]
pub enum RepoError {
    Config(ConfigError),
    Filter(FilterError),
    Statement(StatementError),
    Mapping(MappingError),
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Filter(err) => write!(f, "{err}"),
            Self::Statement(err) => write!(f, "{err}"),
            Self::Mapping(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Filter(err) => Some(err),
            Self::Statement(err) => Some(err),
            Self::Mapping(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ConfigError> for RepoError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<FilterError> for RepoError {
    fn from(value: FilterError) -> Self {
        Self::Filter(value)
    }
}

impl From<StatementError> for RepoError {
    fn from(value: StatementError) -> Self {
        Self::Statement(value)
    }
}

impl From<MappingError> for RepoError {
    fn from(value: MappingError) -> Self {
        Self::Mapping(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for one mapped entity type.
///
/// Implementations are stateless across calls apart from their resolved
/// descriptor; every operation makes at most one round trip to the store.
pub trait Repository<E: Entity> {
    /// Persists one entity, returning it with an auto-generated identifier
    /// populated when the declaration asks for one.
    fn save(&self, entity: E) -> RepoResult<E>;

    /// Persists entities in order, one statement each, stopping at the
    /// first failure. Not transactional: earlier saves stay persisted.
    fn save_all(&self, entities: Vec<E>) -> RepoResult<Vec<E>>;

    /// Deletes the row matching the entity's identifier. Deleting an
    /// absent row is a silent success.
    fn delete(&self, entity: &E) -> RepoResult<()>;

    /// Reads the identifier off the entity, then deletes by it. An
    /// unreadable identifier surfaces as a distinct statement error.
    fn delete_by_id(&self, entity: &E) -> RepoResult<()>;

    /// Loads the entity matching an opaque identifier value.
    fn find_by_id(&self, id: &dyn ToValue) -> RepoResult<Option<E>>;

    /// Loads every row of the mapped table. Row order is store-native and
    /// not guaranteed stable.
    fn find_all(&self) -> RepoResult<Vec<E>>;

    /// Loads every row and filters in memory. Costs O(table size); use
    /// [`Repository::filter`] when the predicate fits a single column
    /// comparison.
    fn find_where(&self, predicate: &dyn Fn(&E) -> bool) -> RepoResult<Vec<E>>;

    /// Filters via a pushed-down SQL predicate. The field must be declared
    /// and the operator allow-listed, otherwise the filter is rejected
    /// before any statement executes.
    fn filter(&self, field: &str, operator: &str, value: &dyn ToValue) -> RepoResult<Vec<E>>;
}
