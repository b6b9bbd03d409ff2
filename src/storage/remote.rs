// Remote storage implementation
// Author: Gabriel Demetrios Lafis

use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::data::Dataset;
use super::{check_id, DataStorage, DatasetPatch, StorageError};

/// Listing entry returned by the datasets endpoint
#[derive(Debug, Deserialize)]
struct DatasetEntry {
    id: String,
}

/// Error body returned by the server
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Storage backed by another engine's REST API
///
/// Uses a blocking client, so it must not be called from inside an async
/// runtime.
pub struct RemoteStorage {
    client: Client,
    base_url: String,
}

impl RemoteStorage {
    /// Create a client for the server at `base_url` (e.g. `http://host:8080`)
    pub fn new(base_url: &str) -> Result<Self, StorageError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::Remote(format!("Failed to create HTTP client: {}", e)))?;

        Ok(RemoteStorage {
            client,
            base_url: format!("{}/api/v1/datasets", base_url.trim_end_matches('/')),
        })
    }

    fn dataset_url(&self, id: &str) -> Result<String, StorageError> {
        check_id(id)?;
        Ok(format!("{}/{}", self.base_url, id))
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder, id: &str) -> Result<Response, StorageError> {
        let response = request
            .send()
            .map_err(|e| StorageError::Remote(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::NOT_FOUND => Err(StorageError::NotFound(id.to_string())),
            StatusCode::CONFLICT => Err(StorageError::AlreadyExists(id.to_string())),
            _ => {
                let message = response
                    .json::<ErrorBody>()
                    .map(|body| body.error)
                    .unwrap_or_else(|_| status.to_string());
                Err(StorageError::Remote(format!("Server error ({}): {}", status, message)))
            }
        }
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StorageError> {
        response
            .json()
            .map_err(|e| StorageError::Remote(format!("Failed to parse response: {}", e)))
    }
}

impl DataStorage for RemoteStorage {
    fn list(&self) -> Result<Vec<Dataset>, StorageError> {
        let response = self.send(self.client.get(&self.base_url), "")?;
        let entries: Vec<DatasetEntry> = Self::decode(response)?;

        debug!("remote storage: fetching {} datasets", entries.len());
        entries.iter().map(|entry| self.get(&entry.id)).collect()
    }

    fn get(&self, id: &str) -> Result<Dataset, StorageError> {
        let url = self.dataset_url(id)?;
        Self::decode(self.send(self.client.get(url), id)?)
    }

    fn create(&self, dataset: &Dataset) -> Result<Dataset, StorageError> {
        check_id(&dataset.id)?;

        let body = json!({
            "id": dataset.id,
            "name": dataset.name,
            "columns": dataset.columns,
            "rows": dataset.rows,
        });

        let response = self.send(self.client.post(&self.base_url).json(&body), &dataset.id)?;
        Self::decode(response)
    }

    fn update(&self, id: &str, patch: &DatasetPatch) -> Result<Dataset, StorageError> {
        let url = self.dataset_url(id)?;
        Self::decode(self.send(self.client.patch(url).json(patch), id)?)
    }

    fn delete(&self, id: &str) -> Result<(), StorageError> {
        let url = self.dataset_url(id)?;
        self.send(self.client.delete(url), id)?;
        Ok(())
    }
}
