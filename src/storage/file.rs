// File storage implementation
// Author: Gabriel Demetrios Lafis

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::data::{read_dataset_document, write_dataset_document, Dataset};
use super::{check_id, sort_by_creation, DataStorage, DatasetPatch, StorageError};

/// File storage keeping one JSON document per dataset
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    /// Create a new file storage, creating the directory if needed
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        if !base_dir.exists() {
            fs::create_dir_all(&base_dir)?;
        }

        Ok(FileStorage { base_dir })
    }

    /// Get the path for a dataset
    fn get_path(&self, id: &str) -> Result<PathBuf, StorageError> {
        check_id(id)?;
        Ok(self.base_dir.join(format!("{}.json", id)))
    }

    /// Write through a temporary file so readers never see half a document
    fn write(&self, path: &Path, dataset: &Dataset) -> Result<(), StorageError> {
        let tmp = path.with_extension("json.tmp");
        write_dataset_document(&tmp, dataset)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl DataStorage for FileStorage {
    fn list(&self) -> Result<Vec<Dataset>, StorageError> {
        let mut datasets = Vec::new();

        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();

            if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            match read_dataset_document(&path) {
                Ok(dataset) => datasets.push(dataset),
                Err(err) => warn!("skipping unreadable dataset file {}: {}", path.display(), err),
            }
        }

        sort_by_creation(&mut datasets);
        Ok(datasets)
    }

    fn get(&self, id: &str) -> Result<Dataset, StorageError> {
        let path = self.get_path(id)?;

        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        Ok(read_dataset_document(&path)?)
    }

    fn create(&self, dataset: &Dataset) -> Result<Dataset, StorageError> {
        let path = self.get_path(&dataset.id)?;

        if path.exists() {
            return Err(StorageError::AlreadyExists(dataset.id.clone()));
        }

        debug!("file storage: writing {}", path.display());
        self.write(&path, dataset)?;
        Ok(dataset.clone())
    }

    fn update(&self, id: &str, patch: &DatasetPatch) -> Result<Dataset, StorageError> {
        let current = self.get(id)?;
        let updated = patch.apply(&current)?;

        self.write(&self.get_path(id)?, &updated)?;
        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let path = self.get_path(id)?;

        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        fs::remove_file(path)?;
        Ok(())
    }
}
