//! Catalog endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use purchase_store::PurchaseStore;
use serde::Deserialize;
use storefront::{Book, BookId, CatalogClient};

use crate::error::{ApiError, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BooksQuery {
    pub category: Option<String>,
}

/// GET /api/books: list the catalog, optionally filtered by `?category=`.
#[tracing::instrument(skip(state))]
pub async fn list<P: PurchaseStore + 'static>(
    State(state): State<Arc<AppState<P>>>,
    ApiQuery(query): ApiQuery<BooksQuery>,
) -> Result<Json<Vec<Book>>, ApiError> {
    let books = match query.category {
        Some(category) => state.catalog.in_category(&category),
        None => state.catalog.list_books().await?,
    };
    Ok(Json(books))
}

/// GET /api/books/{id}: load one book.
#[tracing::instrument(skip(state))]
pub async fn get<P: PurchaseStore + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Invalid book id: {id}")))?;
    let book = state.catalog.get_book(BookId::new(id)).await?;
    Ok(Json(book))
}
