//! The unified ledger error.

use sidechain_consensus::{TransferError, ValidationError};
use sidechain_storage::StorageError;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("storage error: {0}")]
    Storage(StorageError),

    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),
}

/// Coarse classification of a [`ChainError`], used at the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Store failure or internal inconsistency.
    Infrastructure,
    /// The request broke a named rule.
    Validation,
    /// The request collides with existing state.
    Conflict,
    NotFound,
}

impl ChainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChainError::Storage(_) => ErrorKind::Infrastructure,
            ChainError::Rejected(_) => ErrorKind::Validation,
            ChainError::Conflict(_) => ErrorKind::Conflict,
            ChainError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

impl From<StorageError> for ChainError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::DuplicateTransaction(_) => {
                ChainError::Conflict("transaction already exists".into())
            }
            StorageError::NotFound(what) => ChainError::NotFound(format!("{} not found", what)),
            other => ChainError::Storage(other),
        }
    }
}

impl From<TransferError<StorageError>> for ChainError {
    fn from(err: TransferError<StorageError>) -> Self {
        match err {
            TransferError::Infrastructure(e) => e.into(),
            TransferError::Invalid(reason) => ChainError::Rejected(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
