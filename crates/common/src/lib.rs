//! Shared identifiers and the money type used across the bookstore crates.

pub mod money;
pub mod types;

pub use money::Money;
pub use types::{AccountId, BookId, PurchaseId, UserId};
