//! Checkout error types.

use common::BookId;
use purchase_store::PurchaseStoreError;
use storefront::{CartError, SessionError};
use thiserror::Error;

use crate::services::OrderReceipt;

/// One line item whose order request failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedOrder {
    pub product_id: BookId,
    pub reason: String,
}

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The session has no account or user to place orders for.
    #[error("Checkout requires a signed-in account")]
    NotAuthenticated,

    /// The order endpoint refused a request.
    #[error("Order for book {product_id} was rejected ({status}): {message}")]
    OrderRejected {
        product_id: BookId,
        status: u16,
        message: String,
    },

    /// The order endpoint could not be reached.
    #[error("Order request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// At least one order request failed. The cart was left untouched, but
    /// the orders in `succeeded` already exist on the backend.
    #[error("{} of {} orders failed", .failed.len(), .failed.len() + .succeeded.len())]
    OrdersFailed {
        failed: Vec<FailedOrder>,
        succeeded: Vec<OrderReceipt>,
    },

    /// Cart error.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Session error.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// The orders went through but the purchase record could not be written.
    #[error("Could not record purchase: {0}")]
    Purchase(#[from] PurchaseStoreError),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
