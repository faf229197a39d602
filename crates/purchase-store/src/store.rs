use std::pin::Pin;

use async_trait::async_trait;
use common::UserId;
use futures_core::Stream;

use crate::{NewPurchase, PurchaseQuery, PurchaseRecord, Result};

/// A live query over one user's purchases.
///
/// The first item is the full current set; every later item is the full set
/// again after a change. An `Err` item ends the stream.
pub type LiveQuery = Pin<Box<dyn Stream<Item = Result<Vec<PurchaseRecord>>> + Send>>;

/// Core trait for purchase persistence.
///
/// Purchases are append-only: once written they are never updated or deleted.
#[async_trait]
pub trait PurchaseStore: Send + Sync {
    /// Persists a purchase and returns the stored record.
    ///
    /// The store assigns the id and the purchase date, and computes the
    /// total from the items.
    async fn append(&self, purchase: NewPurchase) -> Result<PurchaseRecord>;

    /// Retrieves purchases matching a query, newest first.
    async fn list(&self, query: PurchaseQuery) -> Result<Vec<PurchaseRecord>>;

    /// Opens a live query over a user's purchases, newest first.
    async fn watch(&self, user_id: UserId) -> Result<LiveQuery>;
}

/// Extension trait providing convenience methods for purchase stores.
#[async_trait]
pub trait PurchaseStoreExt: PurchaseStore {
    /// Retrieves all purchases of a user, newest first.
    async fn history_for(&self, user_id: UserId) -> Result<Vec<PurchaseRecord>> {
        self.list(PurchaseQuery::for_user(user_id)).await
    }
}

impl<T: PurchaseStore + ?Sized> PurchaseStoreExt for T {}

/// Orders records by purchase date descending; ties fall back to id descending.
pub fn sort_newest_first(records: &mut [PurchaseRecord]) {
    records.sort_by(|a, b| {
        b.purchase_date
            .cmp(&a.purchase_date)
            .then_with(|| b.id.cmp(&a.id))
    });
}
