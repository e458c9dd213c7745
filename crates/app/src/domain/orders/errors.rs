//! Orders service errors.

use roastery::orders::StatusUpdateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    #[error(transparent)]
    IllegalTransition(#[from] StatusUpdateError),
}
