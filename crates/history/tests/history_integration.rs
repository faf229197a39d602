//! Integration tests: purchase store live queries → history subscriptions.

use std::time::Duration;

use async_trait::async_trait;
use common::{BookId, Money, UserId};
use futures_util::stream;
use history::{HistoryState, HistoryUpdate, PurchaseHistorySync};
use purchase_store::{
    InMemoryPurchaseStore, LiveQuery, NewPurchase, PurchaseQuery, PurchaseRecord,
    PurchaseRecordItem, PurchaseStore, PurchaseStoreError,
};
use storefront::Session;

const WAIT: Duration = Duration::from_secs(2);

fn purchase(user: &str, book: i64, price_cents: i64) -> NewPurchase {
    NewPurchase::new(
        UserId::new(user),
        vec![PurchaseRecordItem::new(
            BookId::new(book),
            format!("Book {book}"),
            Money::from_cents(price_cents),
            format!("/images/{book}.jpg"),
            1,
        )],
    )
}

fn signed_in(user: &str) -> Session {
    let session = Session::new();
    session.authenticate(UserId::new(user)).unwrap();
    session
}

async fn next_update(sub: &mut history::HistorySubscription) -> Option<HistoryUpdate> {
    tokio::time::timeout(WAIT, sub.next())
        .await
        .expect("timed out waiting for history update")
}

#[tokio::test]
async fn test_delivers_full_set_newest_first() {
    let store = InMemoryPurchaseStore::new();
    store.append(purchase("alice", 1, 1000)).await.unwrap();
    store.append(purchase("alice", 2, 2000)).await.unwrap();
    let sync = PurchaseHistorySync::new(store.clone());

    let mut sub = sync.subscribe(&signed_in("alice"));

    let initial = next_update(&mut sub).await.unwrap();
    let ids: Vec<_> = initial.records().iter().map(|r| r.items[0].book_id).collect();
    assert_eq!(ids, vec![BookId::new(2), BookId::new(1)]);
    assert_eq!(sub.state(), HistoryState::Updating);

    store.append(purchase("alice", 3, 3000)).await.unwrap();

    let update = next_update(&mut sub).await.unwrap();
    let records = update.records();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].items[0].book_id, BookId::new(3));
    assert!(
        records
            .windows(2)
            .all(|w| w[0].purchase_date >= w[1].purchase_date)
    );

    sub.unsubscribe();
}

#[tokio::test]
async fn test_other_users_purchases_are_not_delivered() {
    let store = InMemoryPurchaseStore::new();
    let sync = PurchaseHistorySync::new(store.clone());
    let mut sub = sync.subscribe(&signed_in("alice"));
    assert!(next_update(&mut sub).await.unwrap().records().is_empty());

    store.append(purchase("bob", 1, 1000)).await.unwrap();
    store.append(purchase("alice", 2, 500)).await.unwrap();

    let update = next_update(&mut sub).await.unwrap();
    assert_eq!(update.records().len(), 1);
    assert_eq!(update.records()[0].user_id, UserId::new("alice"));

    sub.unsubscribe();
}

#[tokio::test]
async fn test_waits_for_user_before_subscribing() {
    let store = InMemoryPurchaseStore::new();
    store.append(purchase("carol", 4, 1500)).await.unwrap();
    let sync = PurchaseHistorySync::new(store.clone());
    let session = Session::new();

    let mut sub = sync.subscribe(&session);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(sub.state(), HistoryState::AwaitingUser);
    assert_eq!(store.live_query_count(), 0);

    session.authenticate(UserId::new("carol")).unwrap();

    let update = next_update(&mut sub).await.unwrap();
    assert_eq!(update.records().len(), 1);

    sub.unsubscribe();
}

#[tokio::test]
async fn test_unsubscribe_tears_down_live_query() {
    let store = InMemoryPurchaseStore::new();
    let sync = PurchaseHistorySync::new(store.clone());
    let mut sub = sync.subscribe(&signed_in("dave"));
    next_update(&mut sub).await.unwrap();
    assert_eq!(store.live_query_count(), 1);

    let mut states = sub.state_changes();
    sub.unsubscribe();

    assert_eq!(*states.borrow_and_update(), HistoryState::Unsubscribed);
    tokio::time::timeout(WAIT, async {
        while store.live_query_count() > 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("live query still attached after unsubscribe");

    // Appends after teardown reach nobody.
    store.append(purchase("dave", 1, 100)).await.unwrap();
    assert_eq!(store.live_query_count(), 0);
}

#[tokio::test]
async fn test_feed_error_delivers_empty_failure_then_closes() {
    let store = InMemoryPurchaseStore::new();
    store.append(purchase("erin", 1, 1000)).await.unwrap();
    let sync = PurchaseHistorySync::new(store.clone());
    let mut sub = sync.subscribe(&signed_in("erin"));
    next_update(&mut sub).await.unwrap();

    store.fail_live_queries("connection reset");

    let update = next_update(&mut sub).await.unwrap();
    assert_eq!(
        update,
        HistoryUpdate::Failed {
            message: "History connection error: connection reset".to_string(),
            records: vec![],
        }
    );
    assert_eq!(sub.state(), HistoryState::Erroring);

    // No reconnect: the feed is closed for good.
    assert!(next_update(&mut sub).await.is_none());
    store.append(purchase("erin", 2, 1000)).await.unwrap();
    assert_eq!(sub.state(), HistoryState::Erroring);

    sub.unsubscribe();
}

#[tokio::test]
async fn test_session_end_while_waiting_closes_subscription() {
    let sync = PurchaseHistorySync::new(InMemoryPurchaseStore::new());
    let session = Session::new();
    let mut sub = sync.subscribe(&session);

    session.end();

    assert!(next_update(&mut sub).await.is_none());
    assert_eq!(sub.state(), HistoryState::Unsubscribed);
}

/// Store whose live query yields a record that cannot be decoded.
struct CorruptedStore;

#[async_trait]
impl PurchaseStore for CorruptedStore {
    async fn append(&self, _purchase: NewPurchase) -> purchase_store::Result<PurchaseRecord> {
        Err(PurchaseStoreError::Validation("read-only".into()))
    }

    async fn list(&self, _query: PurchaseQuery) -> purchase_store::Result<Vec<PurchaseRecord>> {
        Ok(Vec::new())
    }

    async fn watch(&self, _user_id: UserId) -> purchase_store::Result<LiveQuery> {
        let err = serde_json::from_str::<PurchaseRecord>("{\"id\": 3}").unwrap_err();
        Ok(Box::pin(stream::iter(vec![Err::<Vec<PurchaseRecord>, _>(
            PurchaseStoreError::Serialization(err),
        )])))
    }
}

#[tokio::test]
async fn test_corrupted_record_reports_generic_message() {
    let sync = PurchaseHistorySync::new(CorruptedStore);
    let mut sub = sync.subscribe(&signed_in("frank"));

    let update = next_update(&mut sub).await.unwrap();

    assert!(update.is_failure());
    assert!(update.records().is_empty());
    let HistoryUpdate::Failed { message, .. } = update else {
        unreachable!();
    };
    assert_eq!(message, "Error loading purchase history. Corrupted data.");
}

struct FiniteStore;

#[async_trait]
impl PurchaseStore for FiniteStore {
    async fn append(&self, _purchase: NewPurchase) -> purchase_store::Result<PurchaseRecord> {
        Err(PurchaseStoreError::Validation("read-only".into()))
    }

    async fn list(&self, _query: PurchaseQuery) -> purchase_store::Result<Vec<PurchaseRecord>> {
        Ok(Vec::new())
    }

    async fn watch(&self, _user_id: UserId) -> purchase_store::Result<LiveQuery> {
        Ok(Box::pin(stream::iter(vec![Ok::<_, PurchaseStoreError>(
            Vec::<PurchaseRecord>::new(),
        )])))
    }
}

#[tokio::test]
async fn test_feed_ending_closes_subscription() {
    let sync = PurchaseHistorySync::new(FiniteStore);
    let mut sub = sync.subscribe(&signed_in("grace"));

    let update = next_update(&mut sub).await.unwrap();
    assert!(update.records().is_empty());
    assert!(!update.is_failure());

    assert!(next_update(&mut sub).await.is_none());
    assert_eq!(sub.state(), HistoryState::Unsubscribed);
}
