//! Order gateway speaking to the bookstore HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::orders::{OrderGateway, OrderReceipt, OrderRequest};
use crate::error::CheckoutError;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Creates orders with `POST {base_url}/api/orders`.
#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    client: Client,
    base_url: String,
}

impl HttpOrderGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn create_order(&self, request: OrderRequest) -> Result<OrderReceipt, CheckoutError> {
        let response = self
            .client
            .post(format!("{}/api/orders", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|b| b.message)
                .unwrap_or_else(|_| "Order could not be created".to_string());
            return Err(CheckoutError::OrderRejected {
                product_id: request.product_id,
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
