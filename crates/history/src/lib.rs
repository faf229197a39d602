//! Purchase history synchronisation.
//!
//! [`PurchaseHistorySync`] opens a live query on the purchase store for the
//! session's user and republishes every snapshot through a
//! [`HistorySubscription`] handle:
//! - Each update carries the full record set, newest first, never a diff
//! - A broken feed is reported once as [`HistoryUpdate::Failed`] and not retried
//! - Unsubscribing (or dropping the handle) tears the live query down

pub mod error;
pub mod state;
pub mod subscription;
pub mod sync;

pub use error::{HistoryError, Result};
pub use state::HistoryState;
pub use subscription::{HistorySubscription, HistoryUpdate};
pub use sync::PurchaseHistorySync;
