use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Storage read error: {0}")]
    StorageReadError(String),

    #[error("Storage write error: {0}")]
    StorageWriteError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Catalog responded with {status}: {body}")]
    TransportError { status: StatusCode, body: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    /// True for failures that came from talking to the catalog.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            AppError::NetworkError(_) | AppError::TransportError { .. }
        )
    }

    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            AppError::StorageUnavailable(_)
                | AppError::StorageReadError(_)
                | AppError::StorageWriteError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
