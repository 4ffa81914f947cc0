//! Task service
//!
//! CRUD for user-managed tasks. Automation-created stock tasks flow through
//! here too once a human picks them up.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Task, TaskPriority, TaskStatus, TaskType};

#[derive(Clone)]
pub struct TaskService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct TaskRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    priority: String,
    status: String,
    task_type: String,
    customer_id: Option<Uuid>,
    order_id: Option<Uuid>,
    product_id: Option<Uuid>,
    supplier_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            title: row.title,
            description: row.description,
            due_date: row.due_date,
            priority: TaskPriority::parse(&row.priority).unwrap_or_default(),
            status: TaskStatus::parse(&row.status).unwrap_or_default(),
            task_type: TaskType::parse(&row.task_type).unwrap_or_default(),
            customer_id: row.customer_id,
            order_id: row.order_id,
            product_id: row.product_id,
            supplier_id: row.supplier_id,
            created_at: row.created_at,
        }
    }
}

const TASK_COLUMNS: &str =
    "id, title, description, due_date, priority, status, task_type,
     customer_id, order_id, product_id, supplier_id, created_at";

#[derive(Debug, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,
    pub customer_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
}

impl TaskService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateTaskInput) -> AppResult<Task> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation {
                field: "title".to_string(),
                message: "Title is required".to_string(),
            });
        }

        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            INSERT INTO tasks (title, description, due_date, priority, status, task_type,
                               customer_id, order_id, product_id, supplier_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(input.due_date)
        .bind(input.priority.unwrap_or_default().as_str())
        .bind(TaskStatus::Planned.as_str())
        .bind(input.task_type.unwrap_or_default().as_str())
        .bind(input.customer_id)
        .bind(input.order_id)
        .bind(input.product_id)
        .bind(input.supplier_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    pub async fn update(&self, task_id: Uuid, input: UpdateTaskInput) -> AppResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                due_date = COALESCE($4, due_date),
                priority = COALESCE($5, priority),
                status = COALESCE($6, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(task_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.due_date)
        .bind(input.priority.map(|p| p.as_str()))
        .bind(input.status.map(|s| s.as_str()))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Task".to_string()))?;

        Ok(row.into())
    }

    pub async fn get(&self, task_id: Uuid) -> AppResult<Task> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(task_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Task".to_string()))?;

        Ok(row.into())
    }

    /// List tasks, open ones first, sorted by due date
    pub async fn list(&self, status: Option<TaskStatus>) -> AppResult<Vec<Task>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, TaskRow>(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE status = $1
                     ORDER BY due_date ASC NULLS LAST"
                ))
                .bind(status.as_str())
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, TaskRow>(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks
                     ORDER BY (status = 'Done') ASC, due_date ASC NULLS LAST"
                ))
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn delete(&self, task_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Task".to_string()));
        }

        Ok(())
    }
}
