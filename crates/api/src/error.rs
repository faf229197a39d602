//! API error types with HTTP response mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use purchase_store::PurchaseStoreError;
use storefront::CatalogError;

/// API-level error type that maps to HTTP responses.
///
/// Every error body is `{"message": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Catalog lookup error.
    Catalog(CatalogError),
    /// Order creation error.
    Order(CheckoutError),
    /// Purchase store error.
    Store(PurchaseStoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Catalog(err) => catalog_error_to_response(err),
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Store(err) => store_error_to_response(err),
        };

        let body = serde_json::json!({ "message": message });
        (status, Json(body)).into_response()
    }
}

fn catalog_error_to_response(err: CatalogError) -> (StatusCode, String) {
    match &err {
        CatalogError::NotFound(_) => (StatusCode::NOT_FOUND, "Book not found".to_string()),
        _ => {
            tracing::error!(error = %err, "catalog unavailable");
            (StatusCode::BAD_GATEWAY, err.to_string())
        }
    }
}

fn order_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::OrderRejected { status, message, .. } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            message.clone(),
        ),
        _ => {
            tracing::error!(error = %err, "order creation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

fn store_error_to_response(err: PurchaseStoreError) -> (StatusCode, String) {
    match &err {
        PurchaseStoreError::Validation(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        _ if err.is_corrupted_data() => {
            tracing::error!(error = %err, "corrupted purchase record");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error loading purchase history. Corrupted data.".to_string(),
            )
        }
        _ => {
            tracing::error!(error = %err, "purchase store error");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::Catalog(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Order(err)
    }
}

impl From<PurchaseStoreError> for ApiError {
    fn from(err: PurchaseStoreError) -> Self {
        ApiError::Store(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the `{"message"}` error body.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `Query` extractor whose rejections use the `{"message"}` error body.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
