// API module for exposing functionality via HTTP
// Author: Gabriel Demetrios Lafis

mod handlers;
mod models;
mod routes;
mod server;

pub use handlers::*;
pub use models::*;
pub use routes::*;
pub use server::*;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::data::DataError;
use crate::processing::ProcessingError;
use crate::storage::StorageError;

/// Represents an error in the API module
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    DataError(#[from] DataError),

    #[error("{0}")]
    ProcessingError(#[from] ProcessingError),

    #[error("{0}")]
    StorageError(#[from] StorageError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

fn data_status(err: &DataError) -> StatusCode {
    match err {
        DataError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        DataError::ParseError(_) | DataError::ValidationError(_) | DataError::NotSupported(_) => {
            StatusCode::BAD_REQUEST
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::DataError(err) => data_status(err),
            ApiError::ProcessingError(ProcessingError::DataError(err)) => data_status(err),
            ApiError::ProcessingError(ProcessingError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            ApiError::StorageError(err) => match err {
                StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                StorageError::AlreadyExists(_) => StatusCode::CONFLICT,
                StorageError::InvalidId(_) => StatusCode::BAD_REQUEST,
                StorageError::DataError(err) => data_status(err),
                StorageError::IoError(_) | StorageError::Remote(_) | StorageError::Other(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.to_string(),
        }))
    }
}
