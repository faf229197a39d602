//! History error types.

use purchase_store::PurchaseStoreError;
use storefront::SessionError;
use thiserror::Error;

/// Shown when a stored purchase could not be decoded.
pub const CORRUPTED_DATA_MESSAGE: &str = "Error loading purchase history. Corrupted data.";

/// Errors that can end a history subscription.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The purchase store failed to open or feed the live query.
    #[error("Purchase store error: {0}")]
    Store(#[from] PurchaseStoreError),

    /// The session ended before a user was available.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl HistoryError {
    /// The message shown to the user for this error.
    pub fn user_message(&self) -> String {
        match self {
            HistoryError::Store(e) if e.is_corrupted_data() => CORRUPTED_DATA_MESSAGE.to_string(),
            HistoryError::Store(PurchaseStoreError::Subscription(detail)) => {
                format!("History connection error: {detail}")
            }
            HistoryError::Store(e) => format!("History connection error: {e}"),
            HistoryError::Session(e) => e.to_string(),
        }
    }
}

/// Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupted_records_use_generic_message() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err = HistoryError::from(PurchaseStoreError::Serialization(json_err));

        assert_eq!(err.user_message(), CORRUPTED_DATA_MESSAGE);
    }

    #[test]
    fn feed_errors_carry_their_detail() {
        let err = HistoryError::from(PurchaseStoreError::Subscription("listener closed".into()));

        assert_eq!(err.user_message(), "History connection error: listener closed");
    }
}
