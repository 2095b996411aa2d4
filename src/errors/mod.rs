use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Validation Failed: {0}")]
    ValidationFailed(String),
    #[error("Store Unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let msg = match self {
            AppError::NotFound(msg)
            | AppError::ValidationFailed(msg)
            | AppError::StoreUnavailable(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse { error: msg })
    }
}

/// Failures reading or parsing an employee data source. The reload path
/// absorbs these; only explicit uploads report them to the caller.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read data file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch spreadsheet export: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Failed to parse CSV data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read workbook: {0}")]
    Workbook(String),

    #[error("Unsupported data file: {0}")]
    UnsupportedFormat(String),

    #[error("Data source produced no valid employee rows")]
    NoRecords,

    #[error("Parser task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error, PartialEq)]
pub enum ImageError {
    #[error("Employee {0} not found")]
    EmployeeNotFound(String),

    #[error("No image found for employee {0}")]
    ImageNotFound(String),

    #[error("File exceeds the {max} byte limit")]
    TooLarge { max: usize },

    #[error("Invalid image format: {0}")]
    InvalidFormat(String),

    #[error("Image store unavailable: {0}")]
    Store(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::EmployeeNotFound(_) | ImageError::ImageNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            ImageError::TooLarge { .. } | ImageError::InvalidFormat(_) => {
                AppError::ValidationFailed(err.to_string())
            }
            ImageError::Store(_) => AppError::StoreUnavailable(err.to_string()),
        }
    }
}

impl From<SourceError> for AppError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Worker(_) => AppError::InternalServerError(err.to_string()),
            _ => AppError::ValidationFailed(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for ImageError {
    fn from(err: sqlx::Error) -> Self {
        ImageError::Store(err.to_string())
    }
}
