//! Checkout orchestration for the bookstore.
//!
//! Checkout turns the current cart into one order request per line item,
//! dispatched concurrently against an [`OrderGateway`]. Only when every
//! request succeeds is the purchase recorded and the cart cleared.
//!
//! There is no transactional boundary across the order requests: a partial
//! failure can leave some orders created while the cart is kept intact, and
//! retrying re-issues every line.

pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod services;

pub use error::{CheckoutError, FailedOrder};
pub use orchestrator::CheckoutOrchestrator;
pub use outcome::CheckoutOutcome;
pub use services::{HttpOrderGateway, InMemoryOrderGateway, OrderGateway, OrderReceipt, OrderRequest};
