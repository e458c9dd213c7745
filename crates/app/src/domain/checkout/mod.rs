//! Checkout

pub mod api;
pub mod errors;
pub mod identity;
pub mod service;

pub use api::*;
pub use errors::{CheckoutError, OrderApiError};
pub use identity::*;
pub use service::*;
