//! Core object-relational mapping logic for MinOrm.
//! This crate is the single source of truth for mapping and query invariants.

pub mod db;
pub mod logging;
pub mod meta;
pub mod repo;
pub mod sql;

pub use db::{
    build_pool, open_db, open_db_in_memory, ConnectionProvider, DbError, DbResult, PoolSettings,
    SharedConnection, SqlitePool,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use meta::{
    CoerceError, ColumnMapping, ConfigError, Entity, EntityDescriptor, FieldRole, FieldSpec,
    FromValue, ToValue,
};
pub use repo::{
    MappingError, RepoError, RepoResult, Repository, RepositoryRegistry, SqlRepository,
};
pub use sql::{FilterError, SqlStatement, StatementError, ALLOWED_FILTER_OPERATORS};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
