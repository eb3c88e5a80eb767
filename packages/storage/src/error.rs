// ABOUTME: Error types for document store backends
// ABOUTME: Wraps sqlx, IO and validation failures behind StorageError

use specgen_core::ValidationError;
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Version not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::NotFound(_) | StorageError::Sqlx(sqlx::Error::RowNotFound)
        )
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            StorageError::InvalidInput(_) | StorageError::Validation(_)
        )
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
