//! HTTP handlers for stock ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::{AdjustStockInput, SetStockInput, StockOverview, StockService};
use crate::AppState;
use shared::models::{StockMovement, StockRecord};
use shared::types::QueryLimit;

/// List all stock records with product info
pub async fn list_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<StockOverview>>> {
    let service = StockService::new(state.db);
    let records = service.list().await?;
    Ok(Json(records))
}

/// Get the stock record for a product
pub async fn get_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<StockRecord>> {
    let service = StockService::new(state.db);
    let record = service.get(product_id).await?;
    Ok(Json(record))
}

/// Manually adjust a product's quantity by a signed delta
pub async fn adjust_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AdjustStockInput>,
) -> AppResult<Json<StockRecord>> {
    let service = StockService::new(state.db);
    let record = service
        .adjust(
            input.product_id,
            input.adjustment,
            input.note.as_deref(),
            current_user.0.user_id,
        )
        .await?;
    Ok(Json(record))
}

/// Set a product's quantity (and optionally its threshold) outright
pub async fn set_stock(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<SetStockInput>,
) -> AppResult<Json<StockRecord>> {
    let service = StockService::new(state.db);
    let record = service
        .set_absolute(product_id, input.quantity, input.min_stock)
        .await?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub product_id: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Movement history, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<MovementQuery>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = StockService::new(state.db);
    let limit = query.limit.unwrap_or(QueryLimit::default().0);
    let movements = service.movements(query.product_id, limit).await?;
    Ok(Json(movements))
}
