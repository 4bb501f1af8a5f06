//! Per-entity-type repository registry.
//!
//! # Responsibility
//! - Hand out one shared repository instance per entity type.
//! - Serialize first-time construction so at most one instance is visible.
//!
//! # Invariants
//! - Registration is idempotent: later callers reuse the first instance.
//! - Construction failures are never cached; each request re-attempts.
//! - There is no eviction; entries live as long as the registry.

use crate::db::ConnectionProvider;
use crate::meta::Entity;
use crate::repo::{RepoResult, SqlRepository};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Caches one [`SqlRepository`] per entity type over a shared provider.
///
/// Constructed once and passed by reference to callers; there is no
/// process-global instance.
pub struct RepositoryRegistry<P: ConnectionProvider> {
    provider: Arc<P>,
    repositories: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl<P: ConnectionProvider + Send + Sync + 'static> RepositoryRegistry<P> {
    /// Creates an empty registry over the shared connection provider.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            repositories: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the repository for `E`, constructing it on first access.
    ///
    /// # Errors
    /// Returns `RepoError::Config` when `E`'s declaration does not resolve;
    /// the failure is not cached and the next call re-attempts.
    pub fn repository<E: Entity>(&self) -> RepoResult<Arc<SqlRepository<E, P>>> {
        let key = TypeId::of::<E>();

        {
            let repositories = self
                .repositories
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(existing) = repositories.get(&key) {
                if let Ok(repository) = Arc::clone(existing).downcast::<SqlRepository<E, P>>() {
                    return Ok(repository);
                }
            }
        }

        let mut repositories = self
            .repositories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        // Re-check under the write lock: another thread may have won the
        // construction race while we waited.
        if let Some(existing) = repositories.get(&key) {
            if let Ok(repository) = Arc::clone(existing).downcast::<SqlRepository<E, P>>() {
                return Ok(repository);
            }
        }

        let repository = Arc::new(SqlRepository::<E, P>::try_new(Arc::clone(&self.provider))?);
        repositories.insert(key, repository.clone() as Arc<dyn Any + Send + Sync>);
        Ok(repository)
    }

    /// Number of cached repositories.
    pub fn len(&self) -> usize {
        self.repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The shared connection provider this registry constructs over.
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }
}
