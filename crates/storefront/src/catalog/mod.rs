//! Product catalog retrieval.

mod book;
mod dataset;
mod http;

pub use book::{Book, category_name};
pub use dataset::bundled_books;
pub use http::HttpCatalogClient;

use std::sync::Arc;

use async_trait::async_trait;
use common::BookId;
use thiserror::Error;

/// Errors that can occur while fetching catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response, or the body could not be read.
    #[error("Catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The catalog answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// No book with this id exists.
    #[error("Book not found: {0}")]
    NotFound(BookId),
}

/// Stateless request/response access to the book catalog.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Lists every book in the catalog.
    async fn list_books(&self) -> Result<Vec<Book>, CatalogError>;

    /// Fetches a single book by id.
    async fn get_book(&self, id: BookId) -> Result<Book, CatalogError>;
}

/// Catalog backed by a fixed dataset held in memory.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    books: Arc<Vec<Book>>,
}

impl StaticCatalog {
    pub fn new(books: Vec<Book>) -> Self {
        Self {
            books: Arc::new(books),
        }
    }

    /// Catalog with the bundled dataset.
    pub fn bundled() -> Self {
        Self::new(bundled_books())
    }

    /// Books whose category code equals `category`.
    pub fn in_category(&self, category: &str) -> Vec<Book> {
        self.books
            .iter()
            .filter(|b| b.category == category)
            .cloned()
            .collect()
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::bundled()
    }
}

#[async_trait]
impl CatalogClient for StaticCatalog {
    async fn list_books(&self) -> Result<Vec<Book>, CatalogError> {
        Ok(self.books.as_ref().clone())
    }

    async fn get_book(&self, id: BookId) -> Result<Book, CatalogError> {
        self.books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_catalog_finds_book_by_id() {
        let catalog = StaticCatalog::bundled();

        let book = catalog.get_book(BookId::new(12)).await.unwrap();

        assert_eq!(book.title, "Clean Code");
        assert_eq!(book.price.to_string(), "29.99");
    }

    #[tokio::test]
    async fn static_catalog_reports_missing_book() {
        let catalog = StaticCatalog::bundled();

        let err = catalog.get_book(BookId::new(999)).await.unwrap_err();

        assert!(matches!(err, CatalogError::NotFound(id) if id == BookId::new(999)));
    }

    #[test]
    fn in_category_filters_by_code() {
        let catalog = StaticCatalog::bundled();

        let tech = catalog.in_category("4");

        assert_eq!(tech.len(), 3);
        assert!(tech.iter().all(|b| b.category == "4"));
    }
}
