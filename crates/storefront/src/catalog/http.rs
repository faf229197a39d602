use async_trait::async_trait;
use common::BookId;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{Book, CatalogClient, CatalogError};

/// Error body returned by the backend on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Catalog client talking to the bookstore HTTP API.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Creates a client for the API rooted at `base_url`, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn api_error(response: reqwest::Response, fallback: &str) -> CatalogError {
        let status = response.status().as_u16();
        metrics::counter!("catalog_fetch_failures_total").increment(1);
        let message = response
            .json::<ErrorBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_else(|_| fallback.to_string());
        CatalogError::Api { status, message }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn list_books(&self) -> Result<Vec<Book>, CatalogError> {
        let start = std::time::Instant::now();
        let response = self
            .client
            .get(format!("{}/api/books", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::api_error(response, "Failed to fetch books").await;
            tracing::warn!(error = %err, "catalog listing failed");
            return Err(err);
        }

        let books: Vec<Book> = response.json().await?;
        metrics::histogram!("catalog_fetch_duration_seconds").record(start.elapsed().as_secs_f64());
        tracing::debug!(count = books.len(), "catalog fetched");
        Ok(books)
    }

    #[tracing::instrument(skip(self), fields(base_url = %self.base_url))]
    async fn get_book(&self, id: BookId) -> Result<Book, CatalogError> {
        let response = self
            .client
            .get(format!("{}/api/books/{id}", self.base_url))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound(id)),
            status if status.is_success() => Ok(response.json().await?),
            _ => Err(Self::api_error(response, "Failed to fetch book").await),
        }
    }
}
