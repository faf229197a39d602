//! Purchase records: immutable snapshots of completed checkouts.

use chrono::{DateTime, Utc};
use common::{BookId, Money, PurchaseId, UserId};
use serde::{Deserialize, Serialize};

use crate::{PurchaseStoreError, Result};

/// One book as it was bought.
///
/// Title, price and image are copied at purchase time so the record keeps
/// showing what the customer paid even if the catalog entry changes later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecordItem {
    pub book_id: BookId,
    pub title: String,
    pub price: Money,
    pub image_url: String,
    pub quantity: u32,
}

impl PurchaseRecordItem {
    pub fn new(
        book_id: BookId,
        title: impl Into<String>,
        price: Money,
        image_url: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            book_id,
            title: title.into(),
            price,
            image_url: image_url.into(),
            quantity,
        }
    }

    /// Price multiplied by quantity, or `None` if it does not fit.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_multiply(self.quantity)
    }
}

/// A persisted purchase.
///
/// `total_amount` is stored alongside the items so history views never need
/// to recompute it from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: PurchaseId,
    pub user_id: UserId,
    pub purchase_date: DateTime<Utc>,
    pub items: Vec<PurchaseRecordItem>,
    pub total_amount: Money,
}

impl PurchaseRecord {
    /// Sums `price * quantity` over the items, or `None` on overflow.
    pub fn compute_total(items: &[PurchaseRecordItem]) -> Option<Money> {
        items
            .iter()
            .map(PurchaseRecordItem::line_total)
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line?))
    }

    /// Total number of copies across all items.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

/// A purchase that has not been persisted yet.
///
/// The store assigns the id and the purchase date on append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchase {
    pub user_id: UserId,
    pub items: Vec<PurchaseRecordItem>,
}

impl NewPurchase {
    pub fn new(user_id: UserId, items: Vec<PurchaseRecordItem>) -> Self {
        Self { user_id, items }
    }

    /// The grand total, rejected if a line or the sum overflows.
    pub fn total(&self) -> Result<Money> {
        if let Some(item) = self.items.iter().find(|i| i.line_total().is_none()) {
            return Err(PurchaseStoreError::Validation(format!(
                "item {} total is out of range",
                item.book_id
            )));
        }
        PurchaseRecord::compute_total(&self.items).ok_or_else(|| {
            PurchaseStoreError::Validation("purchase total is out of range".to_string())
        })
    }

    /// Rejects purchases that could never have come from a real cart.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.as_str().is_empty() {
            return Err(PurchaseStoreError::Validation(
                "user id must not be empty".to_string(),
            ));
        }
        if self.items.is_empty() {
            return Err(PurchaseStoreError::Validation(
                "a purchase needs at least one item".to_string(),
            ));
        }
        if let Some(item) = self.items.iter().find(|i| i.quantity == 0) {
            return Err(PurchaseStoreError::Validation(format!(
                "item {} has zero quantity",
                item.book_id
            )));
        }
        if let Some(item) = self.items.iter().find(|i| i.price.is_negative()) {
            return Err(PurchaseStoreError::Validation(format!(
                "item {} has a negative price",
                item.book_id
            )));
        }
        self.total().map(|_| ())
    }

    /// Freezes the purchase into a record with the given id and date.
    pub fn into_record(self, id: PurchaseId, purchase_date: DateTime<Utc>) -> Result<PurchaseRecord> {
        self.validate()?;
        let total_amount = self.total()?;
        Ok(PurchaseRecord {
            id,
            user_id: self.user_id,
            purchase_date,
            items: self.items,
            total_amount,
        })
    }
}
