// Storage module for dataset persistence
// Author: Gabriel Demetrios Lafis

mod cache;
mod file;
mod memory;
mod remote;

pub use cache::*;
pub use file::*;
pub use memory::*;
pub use remote::*;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{DataError, Dataset, Row};
use crate::utils::StorageConfig;

/// Storage capability for dataset records
///
/// The engine never picks an implementation; callers inject one.
pub trait DataStorage: Send + Sync {
    /// List all datasets, oldest first
    fn list(&self) -> Result<Vec<Dataset>, StorageError>;

    /// Load a dataset by id
    fn get(&self, id: &str) -> Result<Dataset, StorageError>;

    /// Store a new dataset
    fn create(&self, dataset: &Dataset) -> Result<Dataset, StorageError>;

    /// Apply a partial update to a stored dataset
    fn update(&self, id: &str, patch: &DatasetPatch) -> Result<Dataset, StorageError>;

    /// Delete a dataset
    fn delete(&self, id: &str) -> Result<(), StorageError>;
}

/// Partial update of a dataset record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Row>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned: Option<bool>,
}

impl DatasetPatch {
    /// Patch renaming a dataset
    pub fn rename(name: &str) -> Self {
        DatasetPatch {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Patch replacing a stored dataset's contents with a transform result
    pub fn from_snapshot(snapshot: &Dataset) -> Self {
        DatasetPatch {
            name: None,
            columns: Some(snapshot.columns.clone()),
            rows: Some(snapshot.rows.clone()),
            cleaned: Some(snapshot.cleaned),
        }
    }

    /// Apply the patch, producing the updated record
    ///
    /// `row_count` is recomputed and `cleaned` never goes back to false.
    /// Nothing changes if the new columns are not unique.
    pub fn apply(&self, dataset: &Dataset) -> Result<Dataset, StorageError> {
        if let Some(columns) = &self.columns {
            Dataset::validate_columns(columns)?;
        }

        let mut updated = dataset.with_schema(
            self.columns.clone().unwrap_or_else(|| dataset.columns.clone()),
            self.rows.clone().unwrap_or_else(|| dataset.rows.clone()),
        );

        if let Some(name) = &self.name {
            updated.name = name.clone();
        }
        if let Some(cleaned) = self.cleaned {
            updated.cleaned = dataset.cleaned || cleaned;
        }

        Ok(updated)
    }
}

/// Reject ids that cannot be used as a record key
pub(crate) fn check_id(id: &str) -> Result<(), StorageError> {
    let valid = !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidId(id.to_string()))
    }
}

/// Sort datasets by creation time, oldest first
pub(crate) fn sort_by_creation(datasets: &mut [Dataset]) {
    datasets.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
}

/// Build the storage backend described by the configuration
pub fn open_storage(config: &StorageConfig) -> Result<Arc<dyn DataStorage>, StorageError> {
    let storage: Arc<dyn DataStorage> = match config.kind.as_str() {
        "memory" => Arc::new(MemoryStorage::new()),
        "file" => Arc::new(FileStorage::new(&config.path)?),
        "cache" => {
            let mut cache = CacheStorage::new(FileStorage::new(&config.path)?);
            if let Some(ttl) = config.cache_ttl {
                cache = cache.with_ttl(Duration::from_secs(ttl));
            }
            Arc::new(cache)
        }
        "remote" => {
            let url = config
                .url
                .as_deref()
                .ok_or_else(|| StorageError::Other("Remote storage requires a 'url'".to_string()))?;
            Arc::new(RemoteStorage::new(url)?)
        }
        other => {
            return Err(StorageError::Other(format!("Unknown storage type '{}'", other)));
        }
    };

    Ok(storage)
}

/// Represents an error in the storage module
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Data error: {0}")]
    DataError(#[from] DataError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Dataset '{0}' not found")]
    NotFound(String),

    #[error("Dataset '{0}' already exists")]
    AlreadyExists(String),

    #[error("Invalid dataset id '{0}'")]
    InvalidId(String),

    #[error("Remote storage error: {0}")]
    Remote(String),

    #[error("Error: {0}")]
    Other(String),
}
