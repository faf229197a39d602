pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use common::{BookId, Money, PurchaseId, UserId};
pub use error::{PurchaseStoreError, Result};
pub use memory::InMemoryPurchaseStore;
pub use postgres::PostgresPurchaseStore;
pub use query::PurchaseQuery;
pub use record::{NewPurchase, PurchaseRecord, PurchaseRecordItem};
pub use store::{LiveQuery, PurchaseStore, PurchaseStoreExt};
