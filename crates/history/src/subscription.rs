//! Subscription handle returned to history consumers.

use std::sync::Arc;

use purchase_store::PurchaseRecord;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::state::HistoryState;

/// One delivery to a history subscriber.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryUpdate {
    /// The full current record set, newest first.
    Records(Vec<PurchaseRecord>),

    /// The live query broke. `records` is always empty and no further
    /// update follows.
    Failed {
        message: String,
        records: Vec<PurchaseRecord>,
    },
}

impl HistoryUpdate {
    pub(crate) fn failed(message: String) -> Self {
        HistoryUpdate::Failed {
            message,
            records: Vec::new(),
        }
    }

    /// The records carried by this update.
    pub fn records(&self) -> &[PurchaseRecord] {
        match self {
            HistoryUpdate::Records(records) | HistoryUpdate::Failed { records, .. } => records,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, HistoryUpdate::Failed { .. })
    }
}

/// Moves the shared state forward if the lifecycle allows it.
pub(crate) fn advance(state: &watch::Sender<HistoryState>, next: HistoryState) -> bool {
    state.send_if_modified(|current| {
        if current.can_transition_to(next) {
            tracing::trace!(from = %current, to = %next, "history state change");
            *current = next;
            true
        } else {
            false
        }
    })
}

/// Handle to a live purchase history subscription.
///
/// The live query stays open until [`unsubscribe`] is called or the handle
/// is dropped.
///
/// [`unsubscribe`]: HistorySubscription::unsubscribe
#[must_use = "a history subscription stays open until it is unsubscribed or dropped"]
pub struct HistorySubscription {
    updates: mpsc::Receiver<HistoryUpdate>,
    state: Arc<watch::Sender<HistoryState>>,
    task: JoinHandle<()>,
}

impl HistorySubscription {
    pub(crate) fn new(
        updates: mpsc::Receiver<HistoryUpdate>,
        state: Arc<watch::Sender<HistoryState>>,
        task: JoinHandle<()>,
    ) -> Self {
        metrics::gauge!("history_subscriptions_active").increment(1.0);
        Self {
            updates,
            state,
            task,
        }
    }

    /// Waits for the next update.
    ///
    /// Returns `None` once the feed has closed, either after a
    /// [`HistoryUpdate::Failed`] or because the session ended.
    pub async fn next(&mut self) -> Option<HistoryUpdate> {
        self.updates.recv().await
    }

    /// Current lifecycle state.
    pub fn state(&self) -> HistoryState {
        *self.state.borrow()
    }

    /// Receiver for observing lifecycle changes.
    pub fn state_changes(&self) -> watch::Receiver<HistoryState> {
        self.state.subscribe()
    }

    /// Closes the subscription. No further updates are delivered.
    pub fn unsubscribe(self) {
        // Teardown happens in Drop.
    }
}

impl Drop for HistorySubscription {
    fn drop(&mut self) {
        self.task.abort();
        self.updates.close();
        advance(&self.state, HistoryState::Unsubscribed);
        metrics::gauge!("history_subscriptions_active").decrement(1.0);
        tracing::debug!("history subscription closed");
    }
}
