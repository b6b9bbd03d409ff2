// Cache storage implementation
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::data::Dataset;
use super::{DataStorage, DatasetPatch, StorageError};

/// Cache entry with expiration
struct CacheEntry {
    data: Dataset,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires| expires > now)
    }
}

/// Read-through cache in front of another storage
///
/// Reads by id are served from memory until the entry expires; writes go
/// to the backend first and then refresh the cache.
pub struct CacheStorage<S> {
    backend: S,
    cache: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Option<Duration>,
}

impl<S: DataStorage> CacheStorage<S> {
    /// Create a new cache storage with a backend
    pub fn new(backend: S) -> Self {
        CacheStorage {
            backend,
            cache: RwLock::new(HashMap::new()),
            default_ttl: None,
        }
    }

    /// Set the default time-to-live for cache entries
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Get a reference to the backing storage
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Number of live entries in the cache
    pub fn cached_len(&self) -> Result<usize, StorageError> {
        let now = Instant::now();
        let cache = self.cache.read().map_err(lock_error)?;
        Ok(cache.values().filter(|entry| entry.is_live(now)).count())
    }

    /// Clear expired entries from the cache
    pub fn clear_expired(&self) -> Result<(), StorageError> {
        let now = Instant::now();
        let mut cache = self.cache.write().map_err(lock_error)?;
        cache.retain(|_, entry| entry.is_live(now));
        Ok(())
    }

    /// Clear all entries from the cache
    pub fn clear_all(&self) -> Result<(), StorageError> {
        self.cache.write().map_err(lock_error)?.clear();
        Ok(())
    }

    fn remember(&self, dataset: &Dataset) -> Result<(), StorageError> {
        let mut cache = self.cache.write().map_err(lock_error)?;

        let expires_at = self.default_ttl.map(|ttl| Instant::now() + ttl);
        cache.insert(
            dataset.id.clone(),
            CacheEntry {
                data: dataset.clone(),
                expires_at,
            },
        );

        Ok(())
    }

    fn forget(&self, id: &str) -> Result<(), StorageError> {
        self.cache.write().map_err(lock_error)?.remove(id);
        Ok(())
    }
}

fn lock_error<T>(_: T) -> StorageError {
    StorageError::Other("Failed to acquire cache lock".to_string())
}

impl<S: DataStorage> DataStorage for CacheStorage<S> {
    fn list(&self) -> Result<Vec<Dataset>, StorageError> {
        self.backend.list()
    }

    fn get(&self, id: &str) -> Result<Dataset, StorageError> {
        {
            let cache = self.cache.read().map_err(lock_error)?;
            if let Some(entry) = cache.get(id).filter(|entry| entry.is_live(Instant::now())) {
                return Ok(entry.data.clone());
            }
        }

        let data = self.backend.get(id)?;
        self.remember(&data)?;
        Ok(data)
    }

    fn create(&self, dataset: &Dataset) -> Result<Dataset, StorageError> {
        let created = self.backend.create(dataset)?;
        self.remember(&created)?;
        Ok(created)
    }

    fn update(&self, id: &str, patch: &DatasetPatch) -> Result<Dataset, StorageError> {
        self.forget(id)?;
        let updated = self.backend.update(id, patch)?;
        self.remember(&updated)?;
        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        self.backend.delete(id)?;
        self.forget(id)
    }
}
