//! Shared application state.

use checkout::InMemoryOrderGateway;
use purchase_store::PurchaseStore;
use storefront::StaticCatalog;

/// Shared application state accessible from all handlers.
pub struct AppState<P: PurchaseStore> {
    pub catalog: StaticCatalog,
    pub orders: InMemoryOrderGateway,
    pub purchases: P,
}

impl<P: PurchaseStore> AppState<P> {
    pub fn new(catalog: StaticCatalog, orders: InMemoryOrderGateway, purchases: P) -> Self {
        Self {
            catalog,
            orders,
            purchases,
        }
    }
}
