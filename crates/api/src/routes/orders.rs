//! Order creation endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use checkout::{OrderGateway, OrderReceipt, OrderRequest};
use purchase_store::PurchaseStore;
use storefront::{CatalogClient, CatalogError};

use crate::error::{ApiError, ApiJson};
use crate::state::AppState;

/// POST /api/orders: create one order for one book.
#[tracing::instrument(skip(state, req), fields(product_id = %req.product_id, user_id = %req.user_id))]
pub async fn create<P: PurchaseStore + 'static>(
    State(state): State<Arc<AppState<P>>>,
    ApiJson(req): ApiJson<OrderRequest>,
) -> Result<(StatusCode, Json<OrderReceipt>), ApiError> {
    if req.quantity == 0 {
        return Err(ApiError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }
    if req.total.is_negative() {
        return Err(ApiError::BadRequest("Total cannot be negative".to_string()));
    }

    match state.catalog.get_book(req.product_id).await {
        Ok(_) => {}
        Err(CatalogError::NotFound(id)) => {
            return Err(ApiError::BadRequest(format!("Unknown product: {id}")));
        }
        Err(e) => return Err(e.into()),
    }

    let receipt = state.orders.create_order(req).await?;
    metrics::counter!("orders_created_total").increment(1);
    tracing::info!(order_id = %receipt.order_id, "order created");

    Ok((StatusCode::CREATED, Json(receipt)))
}
