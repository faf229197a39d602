//! Storefront layer of the bookstore.
//!
//! This crate provides the client-side pieces of the shop:
//! - Catalog model and retrieval ([`CatalogClient`], static dataset or HTTP)
//! - The shopping cart ([`CartStore`]) persisted through a [`CartStorage`]
//! - The per-session context ([`Session`]) that resolves the signed-in user

pub mod cart;
pub mod catalog;
pub mod session;

pub use cart::{
    CART_KEY, CartError, CartLineItem, CartStorage, CartStore, FileCartStorage, MemoryCartStorage,
    Purchasable,
};
pub use catalog::{Book, CatalogClient, CatalogError, HttpCatalogClient, StaticCatalog};
pub use common::{AccountId, BookId, Money, UserId};
pub use session::{Session, SessionError};
