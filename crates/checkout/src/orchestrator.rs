//! Checkout orchestrator: drains the cart into the order backend.

use futures_util::future::join_all;
use purchase_store::{NewPurchase, PurchaseStore};
use storefront::{CartLineItem, CartStorage, CartStore, Session};

use crate::error::{CheckoutError, FailedOrder, Result};
use crate::outcome::CheckoutOutcome;
use crate::services::{OrderGateway, OrderRequest};

/// Orchestrates checkout of a cart.
///
/// One order request is issued per line item, all dispatched concurrently.
/// The cart is cleared only after every request succeeded and the purchase
/// record was appended. Nothing is retried; calling [`checkout`] again after
/// a failure re-issues every line, including those that already succeeded.
///
/// [`checkout`]: CheckoutOrchestrator::checkout
pub struct CheckoutOrchestrator<G, P>
where
    G: OrderGateway,
    P: PurchaseStore,
{
    gateway: G,
    purchases: P,
}

impl<G, P> CheckoutOrchestrator<G, P>
where
    G: OrderGateway,
    P: PurchaseStore,
{
    /// Creates a new checkout orchestrator.
    pub fn new(gateway: G, purchases: P) -> Self {
        Self { gateway, purchases }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn purchases(&self) -> &P {
        &self.purchases
    }

    /// Checks out the cart for the signed-in session.
    ///
    /// An empty cart is reported as [`CheckoutOutcome::EmptyCart`] without
    /// contacting the backend. The session must carry both an account id
    /// (for the order requests) and a resolved user (for the purchase record).
    #[tracing::instrument(skip(self, session, cart))]
    pub async fn checkout<S: CartStorage>(
        &self,
        session: &Session,
        cart: &mut CartStore<S>,
    ) -> Result<CheckoutOutcome> {
        let items = cart.get_all()?;
        if items.is_empty() {
            tracing::debug!("checkout requested on empty cart");
            return Ok(CheckoutOutcome::EmptyCart);
        }

        let account_id = session.account_id().ok_or(CheckoutError::NotAuthenticated)?;
        let user_id = session.user().ok_or(CheckoutError::NotAuthenticated)?;

        // Nothing is sent unless every line and the grand total are representable.
        let requests = items
            .iter()
            .map(|line| OrderRequest::for_line(account_id, line))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        cart.total()?;

        metrics::counter!("checkout_attempts_total").increment(1);
        let start = std::time::Instant::now();

        let results = join_all(
            requests
                .into_iter()
                .map(|request| self.gateway.create_order(request)),
        )
        .await;

        let mut succeeded = Vec::with_capacity(items.len());
        let mut failed = Vec::new();
        for (line, result) in items.iter().zip(results) {
            match result {
                Ok(receipt) => succeeded.push(receipt),
                Err(e) => {
                    tracing::warn!(product_id = %line.id, error = %e, "order request failed");
                    failed.push(FailedOrder {
                        product_id: line.id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !failed.is_empty() {
            metrics::counter!("checkout_failures_total").increment(1);
            metrics::histogram!("checkout_duration_seconds")
                .record(start.elapsed().as_secs_f64());
            tracing::warn!(
                failed = failed.len(),
                succeeded = succeeded.len(),
                "checkout failed, cart kept"
            );
            return Err(CheckoutError::OrdersFailed { failed, succeeded });
        }

        let snapshot = items.iter().map(CartLineItem::snapshot).collect();
        let purchase = match self.purchases.append(NewPurchase::new(user_id, snapshot)).await {
            Ok(purchase) => purchase,
            Err(e) => {
                metrics::counter!("checkout_failures_total").increment(1);
                tracing::error!(error = %e, "orders placed but purchase not recorded");
                return Err(e.into());
            }
        };

        cart.clear()?;

        let duration = start.elapsed().as_secs_f64();
        metrics::histogram!("checkout_duration_seconds").record(duration);
        tracing::info!(
            purchase_id = %purchase.id,
            total = %purchase.total_amount,
            orders = succeeded.len(),
            duration,
            "checkout completed"
        );

        Ok(CheckoutOutcome::Completed {
            receipts: succeeded,
            purchase,
        })
    }
}
