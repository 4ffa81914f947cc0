//! HTTP handlers for purchase order endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::purchasing::{CreatePurchaseInput, PurchaseService, PurchaseWithLines};
use crate::AppState;
use shared::models::Purchase;
use shared::types::QueryLimit;

#[derive(Debug, Deserialize)]
pub struct PurchaseListQuery {
    pub limit: Option<i64>,
}

/// List purchases, newest first
pub async fn list_purchases(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<PurchaseListQuery>,
) -> AppResult<Json<Vec<Purchase>>> {
    let service = PurchaseService::new(state.db);
    let purchases = service
        .list(query.limit.unwrap_or(QueryLimit::default().0))
        .await?;
    Ok(Json(purchases))
}

/// Get a purchase with its lines
pub async fn get_purchase(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseWithLines>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.get(purchase_id).await?;
    Ok(Json(purchase))
}

/// Create a purchase in Ordered state
pub async fn create_purchase(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreatePurchaseInput>,
) -> AppResult<Json<PurchaseWithLines>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.create(input).await?;
    Ok(Json(purchase))
}

/// Receive a purchase and apply its stock increments
pub async fn receive_purchase(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseWithLines>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.receive(purchase_id).await?;
    Ok(Json(purchase))
}

/// Cancel a purchase that has not been received
pub async fn cancel_purchase(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<Purchase>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.cancel(purchase_id).await?;
    Ok(Json(purchase))
}
