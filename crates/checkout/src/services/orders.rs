//! Order gateway trait and in-memory implementation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{AccountId, BookId, Money};
use serde::{Deserialize, Serialize};
use storefront::{CartError, CartLineItem};

use crate::error::CheckoutError;

/// One purchase request: a single line item bought by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub user_id: AccountId,
    pub product_id: BookId,
    pub quantity: u32,
    pub total: Money,
}

impl OrderRequest {
    /// Builds the request for a cart line, totalling `price * quantity`.
    pub fn for_line(user_id: AccountId, line: &CartLineItem) -> Result<Self, CartError> {
        let total = line
            .line_total()
            .ok_or(CartError::LineTotalOutOfRange { book_id: line.id })?;
        Ok(Self {
            user_id,
            product_id: line.id,
            quantity: line.quantity,
            total,
        })
    }
}

/// Confirmation of a created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order_id: String,
    pub user_id: AccountId,
    pub product_id: BookId,
    pub quantity: u32,
    pub total: Money,
}

/// Remote order-creation endpoint. One call per line item; there is no batch form.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Creates a single order.
    async fn create_order(&self, request: OrderRequest) -> Result<OrderReceipt, CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: Vec<OrderReceipt>,
    next_id: u32,
    fail_products: HashSet<BookId>,
    fail_all: bool,
}

/// In-memory order gateway.
///
/// Backs the demo API and lets tests inject failures per product.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderGateway {
    state: Arc<RwLock<InMemoryOrderState>>,
    latency: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl InMemoryOrderGateway {
    /// Creates a new in-memory order gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every order by `latency` before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Configures orders for `product_id` to fail.
    pub fn set_fail_for_product(&self, product_id: BookId, fail: bool) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if fail {
            state.fail_products.insert(product_id);
        } else {
            state.fail_products.remove(&product_id);
        }
    }

    /// Configures every order to fail.
    pub fn set_fail_all(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_all = fail;
    }

    /// Returns the number of orders created.
    pub fn order_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .len()
    }

    /// Returns all created orders in creation order.
    pub fn orders(&self) -> Vec<OrderReceipt> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .clone()
    }

    /// Highest number of requests that were being served at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<OrderReceipt, CheckoutError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let result = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if state.fail_all || state.fail_products.contains(&request.product_id) {
                Err(CheckoutError::OrderRejected {
                    product_id: request.product_id,
                    status: 503,
                    message: "Order service unavailable".to_string(),
                })
            } else {
                state.next_id += 1;
                let receipt = OrderReceipt {
                    order_id: format!("ORD-{:04}", state.next_id),
                    user_id: request.user_id,
                    product_id: request.product_id,
                    quantity: request.quantity,
                    total: request.total,
                };
                state.orders.push(receipt.clone());
                Ok(receipt)
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
