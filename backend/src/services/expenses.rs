//! Expense service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Expense, ExpenseCategory};
use shared::types::PaymentStatus;
use shared::validation::validate_money;

#[derive(Clone)]
pub struct ExpenseService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct ExpenseRow {
    id: Uuid,
    date: DateTime<Utc>,
    category: String,
    amount: Decimal,
    payment_status: String,
    supplier_id: Option<Uuid>,
    notes: Option<String>,
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Expense {
            id: row.id,
            date: row.date,
            category: ExpenseCategory::parse(&row.category).unwrap_or(ExpenseCategory::Operations),
            amount: row.amount,
            payment_status: PaymentStatus::parse(&row.payment_status).unwrap_or_default(),
            supplier_id: row.supplier_id,
            notes: row.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateExpenseInput {
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub date: Option<DateTime<Utc>>,
    pub payment_status: Option<PaymentStatus>,
    pub supplier_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl ExpenseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateExpenseInput) -> AppResult<Expense> {
        validate_money(input.amount).map_err(|message| AppError::Validation {
            field: "amount".to_string(),
            message: message.to_string(),
        })?;

        let row = sqlx::query_as::<_, ExpenseRow>(
            r#"
            INSERT INTO expenses (date, category, amount, payment_status, supplier_id, notes)
            VALUES (COALESCE($1, NOW()), $2, $3, $4, $5, $6)
            RETURNING id, date, category, amount, payment_status, supplier_id, notes
            "#,
        )
        .bind(input.date)
        .bind(input.category.as_str())
        .bind(input.amount)
        .bind(input.payment_status.unwrap_or_default().as_str())
        .bind(input.supplier_id)
        .bind(&input.notes)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    pub async fn list(&self, limit: i64) -> AppResult<Vec<Expense>> {
        let rows = sqlx::query_as::<_, ExpenseRow>(
            "SELECT id, date, category, amount, payment_status, supplier_id, notes
             FROM expenses ORDER BY date DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn delete(&self, expense_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(expense_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Expense".to_string()));
        }

        Ok(())
    }
}
