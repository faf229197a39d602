use criterion::{Criterion, criterion_group, criterion_main};
use purchase_store::{
    BookId, InMemoryPurchaseStore, Money, NewPurchase, PurchaseRecordItem, PurchaseStore,
    PurchaseStoreExt, UserId,
};

fn make_purchase(user: &str, items: i64) -> NewPurchase {
    NewPurchase::new(
        UserId::new(user),
        (1..=items)
            .map(|id| {
                PurchaseRecordItem::new(
                    BookId::new(id),
                    format!("Book {id}"),
                    Money::from_cents(1599),
                    format!("/images/{id}.jpg"),
                    2,
                )
            })
            .collect(),
    )
}

fn bench_append_single_purchase(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("purchase_store/append_single_purchase", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryPurchaseStore::new();
                store.append(make_purchase("alice", 3)).await.unwrap();
            });
        });
    });
}

fn bench_history_100_purchases(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryPurchaseStore::new();
    rt.block_on(async {
        for i in 0..100 {
            let user = if i % 2 == 0 { "alice" } else { "bob" };
            store.append(make_purchase(user, 2)).await.unwrap();
        }
    });

    c.bench_function("purchase_store/history_100_purchases", |b| {
        b.iter(|| {
            rt.block_on(async {
                store.history_for(UserId::new("alice")).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_append_single_purchase,
    bench_history_100_purchases
);
criterion_main!(benches);
