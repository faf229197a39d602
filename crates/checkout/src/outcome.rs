use purchase_store::PurchaseRecord;

use crate::services::OrderReceipt;

/// Result of a checkout that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutOutcome {
    /// The cart was empty; no order was issued.
    EmptyCart,

    /// Every line was ordered, the purchase was recorded and the cart cleared.
    Completed {
        receipts: Vec<OrderReceipt>,
        purchase: PurchaseRecord,
    },
}

impl CheckoutOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CheckoutOutcome::Completed { .. })
    }

    /// The recorded purchase, if checkout completed.
    pub fn purchase(&self) -> Option<&PurchaseRecord> {
        match self {
            CheckoutOutcome::Completed { purchase, .. } => Some(purchase),
            CheckoutOutcome::EmptyCart => None,
        }
    }
}
