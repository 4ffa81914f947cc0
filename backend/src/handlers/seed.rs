//! Demo data seeding endpoint (development only)

use axum::{extract::State, Json};

use crate::error::{AppError, AppResult};
use crate::services::seed::{SeedService, SeedSummary};
use crate::AppState;

/// Seed demo data. Only available in development environments.
pub async fn seed_data(State(state): State<AppState>) -> AppResult<Json<SeedSummary>> {
    if state.config.environment != "development" {
        return Err(AppError::NotFound("Resource".to_string()));
    }

    let service = SeedService::new(state.db);
    let summary = service.run().await?;
    Ok(Json(summary))
}
