//! Shared, read-mostly registry of service configurations.
//!
//! Entries are held as `Arc<RegisteredService>` behind a `RwLock`. Readers
//! clone the `Arc` and release the lock before resolving; writers replace a
//! whole entry at once. A salt rotation therefore never exposes a
//! half-updated strategy: in-flight resolutions finish on the old instance,
//! later ones see the new one.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::crypto::{SaltSource, DEFAULT_SALT_LENGTH};
use crate::error::{ResolutionError, Result};
use crate::generator::PersistentIdGenerator;
use crate::principal::Principal;
use crate::service::Service;
use crate::strategy::UsernameStrategy;

use super::registered::RegisteredService;

/// In-memory registry of `RegisteredService` entries keyed by id.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: RwLock<BTreeMap<u64, Arc<RegisteredService>>>,
}

impl ServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a set of services. Later duplicates win.
    pub fn from_services(services: impl IntoIterator<Item = RegisteredService>) -> Self {
        let map = services
            .into_iter()
            .map(|s| (s.id, Arc::new(s)))
            .collect();
        Self {
            services: RwLock::new(map),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<u64, Arc<RegisteredService>>> {
        self.services.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<u64, Arc<RegisteredService>>> {
        self.services.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert or replace an entry, returning the previous one.
    pub fn insert(&self, service: RegisteredService) -> Option<Arc<RegisteredService>> {
        log::debug!(
            "Registering service {} [{}] with {} strategy",
            service.id,
            service.name,
            service.username_strategy.kind()
        );
        self.write().insert(service.id, Arc::new(service))
    }

    /// Remove an entry.
    pub fn remove(&self, id: u64) -> Option<Arc<RegisteredService>> {
        self.write().remove(&id)
    }

    /// Look up an entry by id.
    pub fn get(&self, id: u64) -> Option<Arc<RegisteredService>> {
        self.read().get(&id).cloned()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All entries, ordered by evaluation order then id.
    pub fn all(&self) -> Vec<Arc<RegisteredService>> {
        let mut all: Vec<_> = self.read().values().cloned().collect();
        all.sort_by_key(|s| (s.evaluation_order, s.id));
        all
    }

    /// First entry (by evaluation order, then id) whose pattern matches `service`.
    pub fn find_matching(&self, service: &dyn Service) -> Option<Arc<RegisteredService>> {
        self.all().into_iter().find(|s| s.matches(service))
    }

    /// Resolve the username for `principal` at `service` using the matching entry.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::ServiceNotFound` when no entry matches, or
    /// any error from the entry's strategy.
    pub fn resolve(&self, principal: &Principal, service: &dyn Service) -> Result<String> {
        let registered = self.find_matching(service).ok_or_else(|| {
            ResolutionError::ServiceNotFound(service.id().unwrap_or("<undefined>").to_string())
        })?;
        registered.resolve_username(principal, service)
    }

    /// Replace the salt of an anonymous entry with a fresh one from `source`.
    ///
    /// The whole entry is swapped in a single write. Every persistent id
    /// previously issued to the service changes.
    ///
    /// # Errors
    ///
    /// `ServiceNotFound` for an unknown id, `Configuration` if the entry does
    /// not use the anonymous strategy.
    pub fn rotate_salt(
        &self,
        id: u64,
        source: &mut impl SaltSource,
    ) -> Result<Arc<RegisteredService>> {
        let salt = source.next_salt(DEFAULT_SALT_LENGTH)?;
        let mut services = self.write();
        let current = services
            .get(&id)
            .ok_or_else(|| ResolutionError::ServiceNotFound(format!("registered service {id}")))?;

        let generator = match &current.username_strategy {
            UsernameStrategy::Anonymous {
                generator: Some(existing),
            } => existing.rekeyed(salt),
            UsernameStrategy::Anonymous { generator: None } => PersistentIdGenerator::new(salt),
            other => {
                return Err(ResolutionError::Configuration(format!(
                    "registered service {id} uses the {} strategy; only anonymous strategies carry a salt",
                    other.kind()
                )))
            }
        };

        let rotated = Arc::new(current.with_strategy(UsernameStrategy::anonymous_with(generator)));
        log::warn!(
            "Rotated salt of registered service {id}; previously issued persistent ids are no longer valid"
        );
        services.insert(id, Arc::clone(&rotated));
        Ok(rotated)
    }
}
