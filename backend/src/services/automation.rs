//! Low-stock task automation
//!
//! Runs after every committed stock mutation. Keeps at most one open Stock
//! task per product: the partial unique index on tasks makes the insert a
//! no-op when an open task already exists, so concurrent runs cannot create
//! duplicates. Replenishing back to OK closes any open task.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::notification::EmailClient;
use shared::models::{
    StockRecord, StockStatus, TaskPriority, TaskStatus, TaskType, STOCK_TASK_DUE_DAYS,
};

#[derive(Clone)]
pub struct LowStockAutomation {
    db: PgPool,
}

impl LowStockAutomation {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// React to the post-mutation status of a stock record.
    pub async fn on_status_change(&self, stock: &StockRecord) -> AppResult<()> {
        if stock.status.needs_replenishment() {
            self.open_task(stock).await
        } else {
            self.close_open_tasks(stock.product_id).await
        }
    }

    async fn open_task(&self, stock: &StockRecord) -> AppResult<()> {
        let product_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM products WHERE id = $1",
        )
        .bind(stock.product_id)
        .fetch_optional(&self.db)
        .await?
        .unwrap_or_else(|| "Unknown product".to_string());

        let priority = TaskPriority::for_stock_status(stock.status);
        let description = match stock.status {
            StockStatus::Out => format!(
                "Out of stock (minimum {}). Reorder from supplier.",
                stock.min_stock
            ),
            _ => format!(
                "Only {} left (minimum {}). Reorder from supplier.",
                stock.quantity, stock.min_stock
            ),
        };
        let due = Utc::now() + Duration::days(STOCK_TASK_DUE_DAYS);

        let inserted = sqlx::query(
            r#"
            INSERT INTO tasks (title, description, task_type, priority, status, due_date, product_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (product_id) WHERE task_type = 'Stock' AND status <> 'Done'
            DO NOTHING
            "#,
        )
        .bind(format!("Restock {}", product_name))
        .bind(&description)
        .bind(TaskType::Stock.as_str())
        .bind(priority.as_str())
        .bind(TaskStatus::Planned.as_str())
        .bind(due)
        .bind(stock.product_id)
        .execute(&self.db)
        .await?;

        if inserted.rows_affected() == 1 {
            tracing::info!(
                product_id = %stock.product_id,
                quantity = stock.quantity,
                status = stock.status.as_str(),
                "Opened restock task"
            );
            // Alert only when the task is first opened, not on every dip
            if let Some(client) = EmailClient::from_env() {
                let quantity = stock.quantity;
                let min_stock = stock.min_stock;
                tokio::spawn(async move {
                    if let Err(e) = client
                        .send_low_stock_alert(&product_name, quantity, min_stock)
                        .await
                    {
                        tracing::warn!("Failed to send low stock alert: {}", e);
                    }
                });
            }
        }

        Ok(())
    }

    async fn close_open_tasks(&self, product_id: Uuid) -> AppResult<()> {
        let closed = sqlx::query(
            "UPDATE tasks SET status = 'Done', updated_at = NOW()
             WHERE product_id = $1 AND task_type = 'Stock' AND status <> 'Done'",
        )
        .bind(product_id)
        .execute(&self.db)
        .await?;

        if closed.rows_affected() > 0 {
            tracing::info!(product_id = %product_id, "Closed restock task after replenishment");
        }

        Ok(())
    }
}
