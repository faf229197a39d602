//! Live purchase history for the signed-in user.

use std::sync::Arc;

use common::UserId;
use futures_util::StreamExt;
use purchase_store::PurchaseStore;
use storefront::Session;
use tokio::sync::{mpsc, watch};

use crate::error::HistoryError;
use crate::state::HistoryState;
use crate::subscription::{HistorySubscription, HistoryUpdate, advance};

const UPDATE_BUFFER: usize = 16;

/// Subscribes sessions to their purchase history.
pub struct PurchaseHistorySync<P: PurchaseStore> {
    store: Arc<P>,
}

impl<P: PurchaseStore> Clone for PurchaseHistorySync<P> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<P: PurchaseStore + 'static> PurchaseHistorySync<P> {
    pub fn new(store: P) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// Opens a history subscription for the session's user.
    ///
    /// Returns immediately. If the session has not resolved a user yet the
    /// subscription sits in [`HistoryState::AwaitingUser`] until it does.
    /// Must be called within a Tokio runtime.
    pub fn subscribe(&self, session: &Session) -> HistorySubscription {
        let (tx, rx) = mpsc::channel(UPDATE_BUFFER);
        let (state, _) = watch::channel(HistoryState::Uninitialized);
        let state = Arc::new(state);
        advance(&state, HistoryState::AwaitingUser);

        let task = tokio::spawn(run(
            Arc::clone(&self.store),
            session.clone(),
            Arc::clone(&state),
            tx,
        ));

        HistorySubscription::new(rx, state, task)
    }
}

async fn run<P: PurchaseStore>(
    store: Arc<P>,
    session: Session,
    state: Arc<watch::Sender<HistoryState>>,
    tx: mpsc::Sender<HistoryUpdate>,
) {
    let user_id = match session.ready().await {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(error = %e, "session ended before history was loaded");
            advance(&state, HistoryState::Unsubscribed);
            return;
        }
    };

    follow(store.as_ref(), user_id, &state, &tx).await;
}

#[tracing::instrument(skip(store, state, tx))]
async fn follow<P: PurchaseStore>(
    store: &P,
    user_id: UserId,
    state: &watch::Sender<HistoryState>,
    tx: &mpsc::Sender<HistoryUpdate>,
) {
    let mut live = match store.watch(user_id).await {
        Ok(live) => live,
        Err(e) => {
            fail(state, tx, e.into()).await;
            return;
        }
    };
    advance(state, HistoryState::Subscribed);
    tracing::debug!("history subscribed");

    while let Some(snapshot) = live.next().await {
        match snapshot {
            Ok(records) => {
                advance(state, HistoryState::Updating);
                metrics::counter!("history_updates_delivered_total").increment(1);
                tracing::debug!(records = records.len(), "history updated");
                if tx.send(HistoryUpdate::Records(records)).await.is_err() {
                    return;
                }
            }
            Err(e) => {
                fail(state, tx, e.into()).await;
                return;
            }
        }
    }

    tracing::debug!("history feed ended");
    advance(state, HistoryState::Unsubscribed);
}

async fn fail(
    state: &watch::Sender<HistoryState>,
    tx: &mpsc::Sender<HistoryUpdate>,
    error: HistoryError,
) {
    let message = error.user_message();
    tracing::warn!(error = %error, "history subscription failed");
    metrics::counter!("history_errors_total").increment(1);
    advance(state, HistoryState::Erroring);
    let _ = tx.send(HistoryUpdate::failed(message)).await;
}
