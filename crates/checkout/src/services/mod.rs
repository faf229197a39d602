//! Order-creation gateways used by checkout.

pub mod http;
pub mod orders;

pub use http::HttpOrderGateway;
pub use orders::{InMemoryOrderGateway, OrderGateway, OrderReceipt, OrderRequest};
