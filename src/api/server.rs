// API server implementation
// Author: Gabriel Demetrios Lafis

use std::sync::{Arc, Mutex, MutexGuard};

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::info;

use crate::storage::DataStorage;
use crate::utils::{DataConfig, ServerConfig};
use super::{routes, ApiError};

/// State shared by all request handlers
pub struct AppState {
    pub storage: Arc<dyn DataStorage>,
    pub data: DataConfig,
    edit_lock: Mutex<()>,
}

impl AppState {
    /// Create the shared state around a storage backend
    pub fn new(storage: Arc<dyn DataStorage>, data: DataConfig) -> Self {
        AppState {
            storage,
            data,
            edit_lock: Mutex::new(()),
        }
    }

    /// Serialize a load, transform and update sequence against other edits
    pub fn lock_edits(&self) -> Result<MutexGuard<'_, ()>, ApiError> {
        self.edit_lock
            .lock()
            .map_err(|_| ApiError::InternalError("Failed to acquire edit lock".to_string()))
    }
}

/// API server
pub struct Server {
    config: ServerConfig,
    state: web::Data<AppState>,
}

impl Server {
    /// Create a new API server
    pub fn new(storage: Arc<dyn DataStorage>, config: ServerConfig, data: DataConfig) -> Self {
        Server {
            config,
            state: web::Data::new(AppState::new(storage, data)),
        }
    }

    /// Run the API server
    pub async fn run(&self) -> std::io::Result<()> {
        let state = self.state.clone();
        let enable_cors = self.config.enable_cors;
        let workers = self.config.worker_count();

        info!(
            "Starting server at http://{}:{} with {} workers",
            self.config.host, self.config.port, workers
        );

        HttpServer::new(move || {
            let cors = if enable_cors {
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600)
            } else {
                Cors::default()
            };

            App::new()
                .app_data(state.clone())
                .wrap(cors)
                .configure(routes::configure)
        })
        .workers(workers)
        .bind((self.config.host.as_str(), self.config.port))?
        .run()
        .await
    }
}
