//! Carts

pub mod errors;
pub mod service;
pub mod storage;

pub use errors::{CartStorageError, CartsServiceError};
pub use service::*;
pub use storage::*;
