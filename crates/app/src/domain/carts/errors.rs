//! Carts service errors.

use std::io;

use thiserror::Error;

/// Errors reading or writing the persisted cart.
#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("cart storage io error")]
    Io(#[from] io::Error),

    #[error("cart record is not valid json")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("storage error")]
    Storage(#[from] CartStorageError),
}
