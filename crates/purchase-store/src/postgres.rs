use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use common::{Money, PurchaseId, UserId};
use futures_util::stream;
use sqlx::postgres::{PgListener, PgRow};
use sqlx::{PgPool, Row};

use crate::{
    LiveQuery, NewPurchase, PurchaseQuery, PurchaseRecord, PurchaseRecordItem, PurchaseStoreError,
    Result, store::PurchaseStore,
};

/// Channel on which appends are announced; the payload is the owning user id.
pub const NOTIFY_CHANNEL: &str = "purchases";

/// PostgreSQL-backed purchase store.
///
/// Live queries listen on [`NOTIFY_CHANNEL`] and re-read the user's full set
/// whenever a purchase for that user is committed.
#[derive(Clone)]
pub struct PostgresPurchaseStore {
    pool: PgPool,
}

impl PostgresPurchaseStore {
    /// Creates a new PostgreSQL purchase store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_record(row: PgRow) -> Result<PurchaseRecord> {
        let items_json: serde_json::Value = row.try_get("items")?;
        let items: Vec<PurchaseRecordItem> = serde_json::from_value(items_json)?;

        Ok(PurchaseRecord {
            id: PurchaseId::new(row.try_get::<String, _>("id")?),
            user_id: UserId::new(row.try_get::<String, _>("user_id")?),
            purchase_date: row.try_get("purchase_date")?,
            items,
            total_amount: Money::from_cents(row.try_get("total_amount_cents")?),
        })
    }

    async fn snapshot(&self, user_id: &UserId) -> Result<Vec<PurchaseRecord>> {
        self.list(PurchaseQuery::for_user(user_id.clone())).await
    }
}

struct WatchState {
    store: PostgresPurchaseStore,
    listener: PgListener,
    user_id: UserId,
    initial: Option<Result<Vec<PurchaseRecord>>>,
    done: bool,
}

#[async_trait]
impl PurchaseStore for PostgresPurchaseStore {
    #[tracing::instrument(skip(self, purchase), fields(user_id = %purchase.user_id))]
    async fn append(&self, purchase: NewPurchase) -> Result<PurchaseRecord> {
        purchase.validate()?;

        // TIMESTAMPTZ keeps microseconds; truncate so the returned record
        // equals what a later read produces.
        let record =
            purchase.into_record(PurchaseId::generate(), Utc::now().trunc_subsecs(6))?;
        let items = serde_json::to_value(&record.items)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchases (id, user_id, purchase_date, items, total_amount_cents)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.user_id.as_str())
        .bind(record.purchase_date)
        .bind(items)
        .bind(record.total_amount.cents())
        .execute(&mut *tx)
        .await?;

        // Delivered to listeners only once the transaction commits.
        sqlx::query("SELECT pg_notify($1, $2)")
            .bind(NOTIFY_CHANNEL)
            .bind(record.user_id.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        metrics::counter!("purchase_records_appended_total").increment(1);
        tracing::debug!(purchase_id = %record.id, total = %record.total_amount, "purchase appended");

        Ok(record)
    }

    async fn list(&self, query: PurchaseQuery) -> Result<Vec<PurchaseRecord>> {
        let mut sql = String::from(
            "SELECT id, user_id, purchase_date, items, total_amount_cents FROM purchases WHERE 1=1",
        );
        let mut param_count = 0;

        if query.user_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND user_id = ${param_count}"));
        }
        if query.from_date.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND purchase_date >= ${param_count}"));
        }
        if query.to_date.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND purchase_date <= ${param_count}"));
        }

        sql.push_str(" ORDER BY purchase_date DESC, id DESC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }

        let mut sqlx_query = sqlx::query(&sql);

        if let Some(user_id) = query.user_id {
            sqlx_query = sqlx_query.bind(user_id.as_str().to_string());
        }
        if let Some(from) = query.from_date {
            sqlx_query = sqlx_query.bind(from);
        }
        if let Some(to) = query.to_date {
            sqlx_query = sqlx_query.bind(to);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }

        let rows = sqlx_query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_record).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn watch(&self, user_id: UserId) -> Result<LiveQuery> {
        let mut listener = PgListener::connect_with(&self.pool).await?;
        listener.listen(NOTIFY_CHANNEL).await?;

        // Listen first, then read, so a commit in between is not lost.
        let initial = self.snapshot(&user_id).await;

        let state = WatchState {
            store: self.clone(),
            listener,
            user_id,
            initial: Some(initial),
            done: false,
        };

        let live = stream::unfold(state, |mut st| async move {
            if st.done {
                return None;
            }
            if let Some(initial) = st.initial.take() {
                st.done = initial.is_err();
                return Some((initial, st));
            }
            loop {
                match st.listener.recv().await {
                    Ok(notification) if notification.payload() == st.user_id.as_str() => {
                        let snapshot = st.store.snapshot(&st.user_id).await;
                        st.done = snapshot.is_err();
                        return Some((snapshot, st));
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        st.done = true;
                        return Some((Err(PurchaseStoreError::Subscription(e.to_string())), st));
                    }
                }
            }
        });

        Ok(Box::pin(live))
    }
}
