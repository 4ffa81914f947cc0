//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::{DashboardReport, MonthlyReport, ReportingService};
use crate::AppState;

/// Today's numbers and stock health
pub async fn dashboard(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> AppResult<Json<DashboardReport>> {
    let service = ReportingService::new(state.db);
    let report = service.dashboard().await?;
    Ok(Json(report))
}

/// Profit and loss for one month
pub async fn monthly_report(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path((year, month)): Path<(i32, u32)>,
) -> AppResult<Json<MonthlyReport>> {
    let service = ReportingService::new(state.db);
    let report = service.monthly(year, month).await?;
    Ok(Json(report))
}
