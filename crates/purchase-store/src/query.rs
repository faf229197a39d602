use chrono::{DateTime, Utc};
use common::UserId;

use crate::PurchaseRecord;

/// Builder for purchase history queries.
///
/// Results are always ordered by purchase date, newest first.
#[derive(Debug, Clone, Default)]
pub struct PurchaseQuery {
    /// Only purchases owned by this user.
    pub user_id: Option<UserId>,

    /// Only purchases made at or after this instant.
    pub from_date: Option<DateTime<Utc>>,

    /// Only purchases made at or before this instant.
    pub to_date: Option<DateTime<Utc>>,

    /// Maximum number of records to return.
    pub limit: Option<usize>,
}

impl PurchaseQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query for one user's purchases.
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            ..Default::default()
        }
    }

    pub fn from_date(mut self, date: DateTime<Utc>) -> Self {
        self.from_date = Some(date);
        self
    }

    pub fn to_date(mut self, date: DateTime<Utc>) -> Self {
        self.to_date = Some(date);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the record passes every filter of this query.
    pub fn matches(&self, record: &PurchaseRecord) -> bool {
        if let Some(ref user) = self.user_id
            && &record.user_id != user
        {
            return false;
        }
        if let Some(from) = self.from_date
            && record.purchase_date < from
        {
            return false;
        }
        if let Some(to) = self.to_date
            && record.purchase_date > to
        {
            return false;
        }
        true
    }
}
