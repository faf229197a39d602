//! Purchase history endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use purchase_store::{NewPurchase, PurchaseQuery, PurchaseRecord, PurchaseRecordItem, PurchaseStore};
use serde::Deserialize;
use storefront::UserId;

use crate::error::{ApiError, ApiJson, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RecordPurchaseRequest {
    pub items: Vec<PurchaseRecordItem>,
}

/// GET /api/users/{uid}/purchases: the user's purchases, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<P: PurchaseStore + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(uid): Path<String>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> Result<Json<Vec<PurchaseRecord>>, ApiError> {
    let mut purchase_query = PurchaseQuery::for_user(UserId::new(uid));
    if let Some(limit) = query.limit {
        purchase_query = purchase_query.limit(limit);
    }
    let records = state.purchases.list(purchase_query).await?;
    Ok(Json(records))
}

/// POST /api/users/{uid}/purchases: record a completed purchase.
#[tracing::instrument(skip(state, req), fields(items = req.items.len()))]
pub async fn create<P: PurchaseStore + 'static>(
    State(state): State<Arc<AppState<P>>>,
    Path(uid): Path<String>,
    ApiJson(req): ApiJson<RecordPurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseRecord>), ApiError> {
    let record = state
        .purchases
        .append(NewPurchase::new(UserId::new(uid), req.items))
        .await?;
    tracing::info!(purchase_id = %record.id, total = %record.total_amount, "purchase recorded");
    Ok((StatusCode::CREATED, Json(record)))
}
