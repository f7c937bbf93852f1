//! Batch cache on top of a [`BlobStore`].
//!
//! Holds exactly one [`CachedBatch`] as camelCase JSON. Writes replace the
//! whole batch; there is no merge and no per-item versioning. A single writer
//! (the refresh job) is assumed.

use std::sync::Arc;

use crate::storage::BlobStore;
use crate::{CachedBatch, StoreError};

/// Blob key of the stored batch.
pub const CACHE_KEY: &str = "paapi-cache.json";

#[derive(Clone)]
pub struct BatchCache {
    store: Arc<dyn BlobStore>,
    key: String,
}

impl BatchCache {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_key(store, CACHE_KEY)
    }

    pub fn with_key(store: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// The stored batch, or `None` if no batch has ever been written.
    pub async fn read(&self) -> Result<Option<CachedBatch>, StoreError> {
        match self.store.get(&self.key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub async fn write(&self, batch: &CachedBatch) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(batch)?;
        self.store.set(&self.key, bytes).await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(&self.key).await
    }
}
