//! HTTP handlers for order endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::orders::{
    CreateOrderInput, OrderService, OrderWithLines, UpdateOrderStatusInput,
};
use crate::AppState;
use shared::models::{Order, OrderStatus};
use shared::types::QueryLimit;

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<i64>,
}

/// List orders, newest first, optionally filtered by status
pub async fn list_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db);
    let orders = service
        .list(query.status, query.limit.unwrap_or(QueryLimit::default().0))
        .await?;
    Ok(Json(orders))
}

/// Get an order with its lines
pub async fn get_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithLines>> {
    let service = OrderService::new(state.db);
    let order = service.get(order_id).await?;
    Ok(Json(order))
}

/// Create an order and decrement stock atomically
pub async fn create_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<OrderWithLines>> {
    let service = OrderService::new(state.db);
    let order = service.create(input).await?;
    Ok(Json(order))
}

/// Transition an order to a new status
pub async fn update_order_status(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdateOrderStatusInput>,
) -> AppResult<Json<Order>> {
    let service = OrderService::new(state.db);
    let order = service.update_status(order_id, input.status).await?;
    Ok(Json(order))
}
