use thiserror::Error;

/// Errors that can occur when interacting with the purchase store.
#[derive(Debug, Error)]
pub enum PurchaseStoreError {
    /// The purchase was rejected before being written.
    #[error("Invalid purchase: {0}")]
    Validation(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A persisted record could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The live query feed broke and will deliver no further snapshots.
    #[error("Subscription error: {0}")]
    Subscription(String),
}

impl PurchaseStoreError {
    /// Returns true if the error stems from a malformed persisted record.
    pub fn is_corrupted_data(&self) -> bool {
        matches!(self, PurchaseStoreError::Serialization(_))
    }
}

/// Result type for purchase store operations.
pub type Result<T> = std::result::Result<T, PurchaseStoreError>;
