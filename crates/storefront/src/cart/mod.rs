//! The shopping cart and its local persistence.

mod line_item;
mod storage;
mod store;

pub use line_item::{CartLineItem, Purchasable};
pub use storage::{CartStorage, FileCartStorage, MemoryCartStorage};
pub use store::{CART_KEY, CartStore};

use common::BookId;
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The persisted cart could not be decoded.
    #[error("Cart data is corrupted: {0}")]
    Corrupted(#[source] serde_json::Error),

    /// The cart could not be encoded for persistence.
    #[error("Cart serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing the backing storage failed.
    #[error("Cart storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A quantity that a line item cannot hold.
    #[error("Invalid quantity for book {book_id}: {quantity}")]
    InvalidQuantity { book_id: BookId, quantity: u32 },

    /// A line total that cannot be represented.
    #[error("Total for book {book_id} is out of range")]
    LineTotalOutOfRange { book_id: BookId },

    /// The cart total cannot be represented.
    #[error("Cart total is out of range")]
    TotalOutOfRange,
}
