//! HTTP handlers for task endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::tasks::{CreateTaskInput, TaskService, UpdateTaskInput};
use crate::AppState;
use shared::models::{Task, TaskStatus};

#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
}

pub async fn list_tasks(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<TaskListQuery>,
) -> AppResult<Json<Vec<Task>>> {
    let service = TaskService::new(state.db);
    let tasks = service.list(query.status).await?;
    Ok(Json(tasks))
}

pub async fn get_task(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(task_id): Path<Uuid>,
) -> AppResult<Json<Task>> {
    let service = TaskService::new(state.db);
    let task = service.get(task_id).await?;
    Ok(Json(task))
}

pub async fn create_task(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(input): Json<CreateTaskInput>,
) -> AppResult<Json<Task>> {
    let service = TaskService::new(state.db);
    let task = service.create(input).await?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(task_id): Path<Uuid>,
    Json(input): Json<UpdateTaskInput>,
) -> AppResult<Json<Task>> {
    let service = TaskService::new(state.db);
    let task = service.update(task_id, input).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(task_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = TaskService::new(state.db);
    service.delete(task_id).await?;
    Ok(Json(()))
}
