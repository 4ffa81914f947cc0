//! HTTP handlers for expense endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::expenses::{CreateExpenseInput, ExpenseService};
use crate::AppState;
use shared::models::Expense;
use shared::types::QueryLimit;

#[derive(Debug, Deserialize)]
pub struct ExpenseListQuery {
    pub limit: Option<i64>,
}

pub async fn list_expenses(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ExpenseListQuery>,
) -> AppResult<Json<Vec<Expense>>> {
    let service = ExpenseService::new(state.db);
    let expenses = service
        .list(query.limit.unwrap_or(QueryLimit::default().0))
        .await?;
    Ok(Json(expenses))
}

pub async fn create_expense(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateExpenseInput>,
) -> AppResult<Json<Expense>> {
    let service = ExpenseService::new(state.db);
    let expense = service.create(input).await?;
    Ok(Json(expense))
}

pub async fn delete_expense(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ExpenseService::new(state.db);
    service.delete(expense_id).await?;
    Ok(Json(()))
}
