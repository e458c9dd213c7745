//! Checkout errors.

use std::time::Duration;

use reqwest::StatusCode;
use roastery::orders::{AddressError, PaymentMethod};
use thiserror::Error;

/// Errors from the order-creation service.
#[derive(Debug, Error)]
pub enum OrderApiError {
    #[error("order service unreachable")]
    Http(#[from] reqwest::Error),

    #[error("order rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("order service unavailable ({status}): {message}")]
    Unavailable { status: StatusCode, message: String },
}

impl OrderApiError {
    /// Whether sending the same request again may succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("payment method {0} is not available")]
    PaymentUnavailable(PaymentMethod),

    #[error("invalid shipping address: {0}")]
    InvalidAddress(#[from] AddressError),

    #[error("failed to create order: {0}")]
    OrderApi(#[from] OrderApiError),

    #[error("order service did not answer within {0:?}")]
    Timeout(Duration),
}

impl CheckoutError {
    /// Whether the shopper can try the same checkout again.
    ///
    /// Transport failures, server errors and timeouts are transient; anything
    /// the order service or local checks rejected needs different input.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::OrderApi(error) => error.is_retryable(),
            Self::Timeout(_) => true,
            Self::EmptyCart | Self::PaymentUnavailable(_) | Self::InvalidAddress(_) => false,
        }
    }
}
