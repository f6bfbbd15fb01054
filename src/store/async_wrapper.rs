//! Async wrapper around synchronous definition stores.
//!
//! Store calls may block on disk or network, so the adapter runs them on
//! `tokio::task::spawn_blocking` rather than on the async runtime.

use super::DefinitionStore;
use crate::domain::TestId;
use crate::error::{StoreError, StoreResult};
use crate::models::TestFunctionMeta;
use async_trait::async_trait;
use std::sync::Arc;

/// Async counterpart of [`DefinitionStore`].
#[async_trait]
pub trait AsyncDefinitionStore: Send + Sync {
    async fn load(&self, id: &TestId) -> StoreResult<Option<TestFunctionMeta>>;
    async fn save(&self, meta: &TestFunctionMeta, payload: &[u8]) -> StoreResult<u32>;
    async fn list(&self) -> StoreResult<Vec<TestFunctionMeta>>;
}

/// Runs any [`DefinitionStore`] on the blocking thread pool.
pub struct AsyncStoreAdapter<S> {
    store: Arc<S>,
}

impl<S> AsyncStoreAdapter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }
}

impl<S> Clone for AsyncStoreAdapter<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

fn join_error(e: tokio::task::JoinError) -> StoreError {
    StoreError::Other(format!("Task join error: {}", e))
}

#[async_trait]
impl<S> AsyncDefinitionStore for AsyncStoreAdapter<S>
where
    S: DefinitionStore + 'static,
{
    async fn load(&self, id: &TestId) -> StoreResult<Option<TestFunctionMeta>> {
        let store = self.store.clone();
        let id = id.clone();

        tokio::task::spawn_blocking(move || store.load(&id))
            .await
            .map_err(join_error)?
    }

    async fn save(&self, meta: &TestFunctionMeta, payload: &[u8]) -> StoreResult<u32> {
        let store = self.store.clone();
        let meta = meta.clone();
        let payload = payload.to_vec();

        tokio::task::spawn_blocking(move || store.save(&meta, &payload))
            .await
            .map_err(join_error)?
    }

    async fn list(&self) -> StoreResult<Vec<TestFunctionMeta>> {
        let store = self.store.clone();

        tokio::task::spawn_blocking(move || store.list())
            .await
            .map_err(join_error)?
    }
}
