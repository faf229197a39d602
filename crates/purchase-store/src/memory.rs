use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use common::{PurchaseId, UserId};
use futures_util::stream;
use tokio::sync::RwLock;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
    LiveQuery, NewPurchase, PurchaseQuery, PurchaseRecord, PurchaseStoreError, Result,
    store::{PurchaseStore, sort_newest_first},
};

const CHANGE_FEED_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
enum Change {
    Appended(UserId),
    Failed(String),
}

/// In-memory purchase store for tests and the demo server.
///
/// Live queries are driven by a broadcast change feed. A watcher that falls
/// behind the feed simply re-reads the full set, which is what it would have
/// delivered anyway.
#[derive(Clone)]
pub struct InMemoryPurchaseStore {
    records: Arc<RwLock<Vec<PurchaseRecord>>>,
    changes: broadcast::Sender<Change>,
}

impl InMemoryPurchaseStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            changes,
        }
    }

    /// Returns the total number of records stored.
    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns the number of live queries currently attached to the change feed.
    pub fn live_query_count(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Breaks every open live query with the given reason.
    ///
    /// Used to exercise the subscription error path.
    pub fn fail_live_queries(&self, reason: impl Into<String>) {
        let _ = self.changes.send(Change::Failed(reason.into()));
    }

    async fn snapshot(&self, user_id: &UserId) -> Vec<PurchaseRecord> {
        let store = self.records.read().await;
        let mut records: Vec<_> = store
            .iter()
            .filter(|r| &r.user_id == user_id)
            .cloned()
            .collect();
        sort_newest_first(&mut records);
        records
    }
}

impl Default for InMemoryPurchaseStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Purchase dates must be strictly increasing so that back-to-back appends
/// keep their insertion order in newest-first listings.
fn next_purchase_date(last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match last {
        Some(last) if now <= last => last + Duration::microseconds(1),
        _ => now,
    }
}

struct WatchState {
    store: InMemoryPurchaseStore,
    rx: broadcast::Receiver<Change>,
    user_id: UserId,
    initial: Option<Vec<PurchaseRecord>>,
    done: bool,
}

#[async_trait]
impl PurchaseStore for InMemoryPurchaseStore {
    #[tracing::instrument(skip(self, purchase), fields(user_id = %purchase.user_id))]
    async fn append(&self, purchase: NewPurchase) -> Result<PurchaseRecord> {
        purchase.validate()?;

        let record = {
            let mut store = self.records.write().await;
            let purchase_date = next_purchase_date(store.iter().map(|r| r.purchase_date).max());
            let record = purchase.into_record(PurchaseId::generate(), purchase_date)?;
            store.push(record.clone());
            record
        };

        metrics::counter!("purchase_records_appended_total").increment(1);
        tracing::debug!(purchase_id = %record.id, total = %record.total_amount, "purchase appended");

        // No receivers simply means nobody is watching.
        let _ = self.changes.send(Change::Appended(record.user_id.clone()));
        Ok(record)
    }

    async fn list(&self, query: PurchaseQuery) -> Result<Vec<PurchaseRecord>> {
        let store = self.records.read().await;
        let mut records: Vec<_> = store.iter().filter(|r| query.matches(r)).cloned().collect();
        sort_newest_first(&mut records);
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    #[tracing::instrument(skip(self))]
    async fn watch(&self, user_id: UserId) -> Result<LiveQuery> {
        // Subscribe before reading so no append slips between the two.
        let rx = self.changes.subscribe();
        let initial = self.snapshot(&user_id).await;

        let state = WatchState {
            store: self.clone(),
            rx,
            user_id,
            initial: Some(initial),
            done: false,
        };

        let live = stream::unfold(state, |mut st| async move {
            if st.done {
                return None;
            }
            if let Some(initial) = st.initial.take() {
                return Some((Ok(initial), st));
            }
            loop {
                match st.rx.recv().await {
                    Ok(Change::Appended(user)) if user == st.user_id => {
                        let snapshot = st.store.snapshot(&st.user_id).await;
                        return Some((Ok(snapshot), st));
                    }
                    Ok(Change::Appended(_)) => continue,
                    Ok(Change::Failed(reason)) => {
                        st.done = true;
                        return Some((Err(PurchaseStoreError::Subscription(reason)), st));
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "live query lagged, resending full set");
                        let snapshot = st.store.snapshot(&st.user_id).await;
                        return Some((Ok(snapshot), st));
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        Ok(Box::pin(live))
    }
}
