//! Persistence backends for test definitions.
//!
//! A store keeps metadata snapshots keyed by identity and assigns a version on
//! every save. The engine only needs `load` and `save`; `list` backs the
//! command line catalog.

mod async_wrapper;
mod local_dir;
mod remote;

pub use async_wrapper::{AsyncDefinitionStore, AsyncStoreAdapter};
pub use local_dir::LocalDirStore;
pub use remote::RemoteStore;

use crate::config::Config;
use crate::domain::TestId;
use crate::error::StoreResult;
use crate::models::TestFunctionMeta;

/// Storage for test definitions.
pub trait DefinitionStore: Send + Sync {
    /// Load the stored metadata for `id`, `None` if never saved.
    fn load(&self, id: &TestId) -> StoreResult<Option<TestFunctionMeta>>;

    /// Save `meta` with its payload and return the assigned version.
    fn save(&self, meta: &TestFunctionMeta, payload: &[u8]) -> StoreResult<u32>;

    /// Every stored definition.
    fn list(&self) -> StoreResult<Vec<TestFunctionMeta>>;
}

/// Build the store selected by configuration: the remote store when a URL
/// is configured, the local directory store otherwise.
pub fn from_config(config: &Config) -> Box<dyn DefinitionStore> {
    match &config.remote_url {
        Some(_) => Box::new(RemoteStore::new(config)),
        None => Box::new(LocalDirStore::new(&config.local_dir)),
    }
}

