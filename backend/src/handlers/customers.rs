//! HTTP handlers for customer endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::customers::{CreateCustomerInput, CustomerService, UpdateCustomerInput};
use crate::services::orders::OrderService;
use crate::AppState;
use shared::models::{Customer, Order, TimelineEntry, TimelineKind};
use shared::types::QueryLimit;

/// List customers, newest first
pub async fn list_customers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<Vec<Customer>>> {
    let service = CustomerService::new(state.db);
    let customers = service.list().await?;
    Ok(Json(customers))
}

/// Get a customer
pub async fn get_customer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.get(customer_id).await?;
    Ok(Json(customer))
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.create(input).await?;
    Ok(Json(customer))
}

/// Update a customer's editable fields
pub async fn update_customer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<UpdateCustomerInput>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.update(customer_id, input).await?;
    Ok(Json(customer))
}

/// Delete a customer with no order history
pub async fn delete_customer(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = CustomerService::new(state.db);
    service.delete(customer_id).await?;
    Ok(Json(()))
}

/// Orders for one customer
pub async fn list_customer_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db);
    let orders = service.list_for_customer(customer_id).await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    pub limit: Option<i64>,
}

/// Activity timeline for a customer
pub async fn get_customer_timeline(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
    Query(query): Query<TimelineQuery>,
) -> AppResult<Json<Vec<TimelineEntry>>> {
    let service = CustomerService::new(state.db);
    let entries = service
        .timeline(customer_id, query.limit.unwrap_or(QueryLimit::default().0))
        .await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct AddNoteInput {
    pub description: String,
}

/// Append a note to a customer's timeline
pub async fn add_customer_note(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
    Json(input): Json<AddNoteInput>,
) -> AppResult<Json<TimelineEntry>> {
    let service = CustomerService::new(state.db);
    let entry = service
        .add_timeline_entry(customer_id, TimelineKind::Note, &input.description)
        .await?;
    Ok(Json(entry))
}

/// Recompute a customer's derived statistics on demand
pub async fn recompute_customer_stats(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(customer_id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let service = CustomerService::new(state.db);
    let customer = service.recompute_stats(customer_id).await?;
    Ok(Json(customer))
}
