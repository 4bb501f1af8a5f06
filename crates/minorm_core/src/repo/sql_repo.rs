//! Generic SQL-backed repository implementation.
//!
//! # Responsibility
//! - Execute descriptor-built statements over a shared connection provider.
//! - Reconstruct entity instances from result rows.
//!
//! # Invariants
//! - Each store-backed operation acquires one connection, runs exactly one
//!   statement, and releases the connection before returning.
//! - Construction is the only point where configuration errors surface.

use crate::db::ConnectionProvider;
use crate::meta::{Entity, EntityDescriptor, ToValue};
use crate::repo::{MappingError, RepoResult, Repository};
use crate::sql::{self, SqlStatement};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Row};
use std::marker::PhantomData;
use std::sync::Arc;

/// Repository over one entity type, backed by SQL statements built from the
/// type's resolved descriptor.
pub struct SqlRepository<E: Entity, P: ConnectionProvider> {
    descriptor: EntityDescriptor,
    provider: Arc<P>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity, P: ConnectionProvider> SqlRepository<E, P> {
    /// Resolves the entity's descriptor and constructs the repository.
    ///
    /// # Errors
    /// Returns `RepoError::Config` when the entity declaration is unusable
    /// (no fields, no identifier, hostile names, nothing to insert).
    pub fn try_new(provider: Arc<P>) -> RepoResult<Self> {
        let descriptor = EntityDescriptor::resolve::<E>()?;
        debug!(
            "event=repo_create module=repo status=ok entity={} table={}",
            descriptor.entity_name(),
            descriptor.table()
        );
        Ok(Self {
            descriptor,
            provider,
            _entity: PhantomData,
        })
    }

    /// The resolved descriptor this repository operates on.
    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    fn query_entities(&self, statement: SqlStatement) -> RepoResult<Vec<E>> {
        let conn = self.provider.connection()?;
        let mut prepared = conn.prepare(&statement.sql)?;
        let mut rows = prepared.query(params_from_iter(statement.params))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(map_row::<E>(row, &self.descriptor)?);
        }
        Ok(entities)
    }
}

impl<E: Entity, P: ConnectionProvider> Repository<E> for SqlRepository<E, P> {
    fn save(&self, mut entity: E) -> RepoResult<E> {
        let statement = sql::insert(&self.descriptor, &entity)?;
        let conn = self.provider.connection()?;
        conn.execute(&statement.sql, params_from_iter(statement.params))?;

        let identifier = self.descriptor.identifier();
        if identifier.auto_generated {
            let key = conn.last_insert_rowid();
            entity
                .write_field(identifier.field, Value::Integer(key))
                .map_err(|cause| MappingError::Incompatible {
                    column: identifier.column,
                    field: identifier.field,
                    cause,
                })?;
        }

        debug!(
            "event=repo_save module=repo status=ok table={}",
            self.descriptor.table()
        );
        Ok(entity)
    }

    fn save_all(&self, entities: Vec<E>) -> RepoResult<Vec<E>> {
        let mut saved = Vec::with_capacity(entities.len());
        for entity in entities {
            saved.push(self.save(entity)?);
        }
        Ok(saved)
    }

    fn delete(&self, entity: &E) -> RepoResult<()> {
        let statement = sql::delete_by_id(&self.descriptor, entity)?;
        let conn = self.provider.connection()?;
        let changed = conn.execute(&statement.sql, params_from_iter(statement.params))?;
        debug!(
            "event=repo_delete module=repo status=ok table={} rows={}",
            self.descriptor.table(),
            changed
        );
        Ok(())
    }

    fn delete_by_id(&self, entity: &E) -> RepoResult<()> {
        // Surface an unreadable identifier before touching the store.
        let identifier = self.descriptor.identifier();
        if entity.read_field(identifier.field).is_none() {
            return Err(sql::StatementError::UnreadableField {
                entity: self.descriptor.entity_name(),
                field: identifier.field,
            }
            .into());
        }
        self.delete(entity)
    }

    fn find_by_id(&self, id: &dyn ToValue) -> RepoResult<Option<E>> {
        let statement = sql::find_by_id(&self.descriptor, id.to_value());
        let conn = self.provider.connection()?;
        let mut prepared = conn.prepare(&statement.sql)?;
        let mut rows = prepared.query(params_from_iter(statement.params))?;
        match rows.next()? {
            Some(row) => Ok(Some(map_row::<E>(row, &self.descriptor)?)),
            None => Ok(None),
        }
    }

    fn find_all(&self) -> RepoResult<Vec<E>> {
        self.query_entities(sql::find_all(&self.descriptor))
    }

    fn find_where(&self, predicate: &dyn Fn(&E) -> bool) -> RepoResult<Vec<E>> {
        let mut entities = self.find_all()?;
        entities.retain(|entity| predicate(entity));
        Ok(entities)
    }

    fn filter(&self, field: &str, operator: &str, value: &dyn ToValue) -> RepoResult<Vec<E>> {
        let statement = sql::filter(&self.descriptor, field, operator, value.to_value())?;
        self.query_entities(statement)
    }
}

/// Converts one result row into a fresh entity instance.
///
/// Assigns every mapped column, identifier included. A missing column or a
/// failed coercion aborts the read.
fn map_row<E: Entity>(row: &Row<'_>, descriptor: &EntityDescriptor) -> RepoResult<E> {
    let mut entity = E::default();
    for mapping in descriptor.columns() {
        let value: Value = match row.get(mapping.column) {
            Ok(value) => value,
            Err(rusqlite::Error::InvalidColumnName(_)) => {
                return Err(MappingError::MissingColumn {
                    table: descriptor.table().to_string(),
                    column: mapping.column,
                }
                .into());
            }
            Err(err) => return Err(err.into()),
        };
        entity
            .write_field(mapping.field, value)
            .map_err(|cause| MappingError::Incompatible {
                column: mapping.column,
                field: mapping.field,
                cause,
            })?;
    }
    Ok(entity)
}
