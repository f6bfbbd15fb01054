//! Registry of test definitions.
//!
//! The registry maps a stable [`TestId`] to the metadata of a definition. It is
//! append-only: the first registration of an identity wins and later calls
//! return the stored metadata untouched. The only transition an entry ever
//! goes through is receiving its persisted version.

mod declaration;

pub use declaration::Declaration;

use crate::domain::TestId;
use crate::error::{DefinitionResult, StoreError, StoreResult};
use crate::models::TestFunctionMeta;
use crate::store::DefinitionStore;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

static GLOBAL_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// The process-wide registry.
pub fn global() -> &'static Registry {
    &GLOBAL_REGISTRY
}

/// Thread-safe store of test definition metadata.
///
/// Use [`global()`] for the process-wide instance, or construct one per test
/// case with [`Registry::new`].
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<TestId, Arc<TestFunctionMeta>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration, or return the metadata already registered
    /// under its identity.
    ///
    /// # Errors
    ///
    /// Returns a `DefinitionError` if the declaration is malformed.
    pub fn register(&self, declaration: &Declaration) -> DefinitionResult<Arc<TestFunctionMeta>> {
        let candidate = declaration.to_meta()?;
        Ok(self.insert_first(candidate))
    }

    /// Register metadata recovered from a store.
    ///
    /// A versioned copy of an unversioned local entry upgrades its version;
    /// in every other case the first registration wins.
    pub fn adopt(&self, meta: TestFunctionMeta) -> Arc<TestFunctionMeta> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(&meta.uuid).cloned() {
            Some(existing) => {
                if existing.version.is_none()
                    && meta.version.is_some()
                    && existing.same_definition(&meta)
                {
                    debug!(test_id = %meta.uuid, version = ?meta.version, "Recovered stored version");
                    let upgraded = Arc::new(meta);
                    entries.insert(upgraded.uuid.clone(), upgraded.clone());
                    upgraded
                } else {
                    if !existing.same_definition(&meta) {
                        warn!(test_id = %meta.uuid, "Stored definition differs from registered one, keeping registered");
                    }
                    existing
                }
            }
            None => {
                debug!(test_id = %meta.uuid, name = %meta.name, "Adopted stored definition");
                let meta = Arc::new(meta);
                entries.insert(meta.uuid.clone(), meta.clone());
                meta
            }
        }
    }

    pub(crate) fn insert_first(&self, candidate: TestFunctionMeta) -> Arc<TestFunctionMeta> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(&candidate.uuid) {
            if !existing.same_definition(&candidate) {
                warn!(
                    test_id = %candidate.uuid,
                    name = %candidate.name,
                    "Definition re-registered with different content, keeping first registration"
                );
            }
            return existing.clone();
        }

        debug!(
            test_id = %candidate.uuid,
            module = %candidate.module,
            name = %candidate.name,
            "Registered test definition"
        );
        let meta = Arc::new(candidate);
        entries.insert(meta.uuid.clone(), meta.clone());
        meta
    }

    /// Look up metadata by identity.
    pub fn get(&self, id: &TestId) -> Option<Arc<TestFunctionMeta>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn contains(&self, id: &TestId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All registered metadata, ordered by module then name.
    pub fn all(&self) -> Vec<Arc<TestFunctionMeta>> {
        let mut all: Vec<_> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        all.sort_by(|a, b| (&a.module, &a.name).cmp(&(&b.module, &b.name)));
        all
    }

    pub fn ids(&self) -> Vec<TestId> {
        self.all().iter().map(|meta| meta.uuid.clone()).collect()
    }

    /// Record the version assigned by a store to an unversioned entry.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown identity, `VersionConflict` when the entry
    /// already carries a different version.
    pub fn record_version(&self, id: &TestId, version: u32) -> StoreResult<Arc<TestFunctionMeta>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let existing = entries
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        match existing.version {
            Some(registered) if registered == version => Ok(existing),
            Some(registered) => Err(StoreError::VersionConflict {
                id: id.clone(),
                registered,
                stored: version,
            }),
            None => {
                let versioned = Arc::new(existing.with_version(version));
                entries.insert(id.clone(), versioned.clone());
                Ok(versioned)
            }
        }
    }

    /// Resolve metadata for `id`, consulting the store when the registry has
    /// no versioned entry.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn load(
        &self,
        store: &dyn DefinitionStore,
        id: &TestId,
    ) -> StoreResult<Option<Arc<TestFunctionMeta>>> {
        let local = self.get(id);
        if let Some(meta) = &local {
            if meta.version.is_some() {
                return Ok(local);
            }
        }

        match store.load(id)? {
            Some(stored) => Ok(Some(self.adopt(stored))),
            None => Ok(local),
        }
    }

    /// Persist a registered definition unless it already has a version.
    ///
    /// Returns the definition's version either way.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown identity; store failures are propagated.
    pub fn save(&self, store: &dyn DefinitionStore, id: &TestId, payload: &[u8]) -> StoreResult<u32> {
        let meta = self
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(version) = meta.version {
            debug!(test_id = %id, version, "Definition already persisted, skipping upload");
            return Ok(version);
        }

        let version = store.save(&meta, payload)?;
        self.record_version(id, version)?;
        debug!(test_id = %id, version, "Persisted test definition");
        Ok(version)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entries", &self.len())
            .finish()
    }
}
