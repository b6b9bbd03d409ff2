// Memory storage implementation
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;
use std::sync::RwLock;

use log::debug;

use crate::data::Dataset;
use super::{sort_by_creation, DataStorage, DatasetPatch, StorageError};

/// Memory storage for datasets
pub struct MemoryStorage {
    datasets: RwLock<HashMap<String, Dataset>>,
}

impl MemoryStorage {
    /// Create a new memory storage
    pub fn new() -> Self {
        MemoryStorage {
            datasets: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_error<T>(_: T) -> StorageError {
    StorageError::Other("Failed to acquire storage lock".to_string())
}

impl DataStorage for MemoryStorage {
    fn list(&self) -> Result<Vec<Dataset>, StorageError> {
        let datasets = self.datasets.read().map_err(lock_error)?;

        let mut all: Vec<Dataset> = datasets.values().cloned().collect();
        sort_by_creation(&mut all);
        Ok(all)
    }

    fn get(&self, id: &str) -> Result<Dataset, StorageError> {
        let datasets = self.datasets.read().map_err(lock_error)?;

        datasets
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(id.to_string()))
    }

    fn create(&self, dataset: &Dataset) -> Result<Dataset, StorageError> {
        let mut datasets = self.datasets.write().map_err(lock_error)?;

        if datasets.contains_key(&dataset.id) {
            return Err(StorageError::AlreadyExists(dataset.id.clone()));
        }

        debug!("memory storage: creating dataset {}", dataset.id);
        datasets.insert(dataset.id.clone(), dataset.clone());
        Ok(dataset.clone())
    }

    fn update(&self, id: &str, patch: &DatasetPatch) -> Result<Dataset, StorageError> {
        let mut datasets = self.datasets.write().map_err(lock_error)?;

        let current = datasets
            .get_mut(id)
            .ok_or_else(|| StorageError::NotFound(id.to_string()))?;

        *current = patch.apply(current)?;
        Ok(current.clone())
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let mut datasets = self.datasets.write().map_err(lock_error)?;

        if datasets.remove(id).is_none() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
