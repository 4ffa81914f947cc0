//! Customer service and statistics aggregator
//!
//! The derived statistics block (total_value, order_count, favorite_product,
//! last_order_date, activity tier) is recomputed from qualifying orders and
//! overwritten as a whole. Recomputation runs after every order mutation that
//! touches the customer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Customer, CustomerStatus, CustomerType, TimelineEntry, TimelineKind};
use shared::validation::validate_email;

#[derive(Clone)]
pub struct CustomerService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    zip_code: Option<String>,
    city: Option<String>,
    customer_type: String,
    status: String,
    total_value: Decimal,
    order_count: i64,
    favorite_product: Option<String>,
    last_order_date: Option<DateTime<Utc>>,
    tags: Option<String>,
    notes: Option<String>,
    next_step: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            address: row.address,
            zip_code: row.zip_code,
            city: row.city,
            customer_type: CustomerType::parse(&row.customer_type).unwrap_or_default(),
            status: CustomerStatus::parse(&row.status).unwrap_or_default(),
            total_value: row.total_value,
            order_count: row.order_count,
            favorite_product: row.favorite_product,
            last_order_date: row.last_order_date,
            tags: row.tags,
            notes: row.notes,
            next_step: row.next_step,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct TimelineRow {
    id: Uuid,
    customer_id: Uuid,
    date: DateTime<Utc>,
    kind: String,
    description: String,
}

impl From<TimelineRow> for TimelineEntry {
    fn from(row: TimelineRow) -> Self {
        TimelineEntry {
            id: row.id,
            customer_id: row.customer_id,
            date: row.date,
            kind: TimelineKind::parse(&row.kind).unwrap_or(TimelineKind::Note),
            description: row.description,
        }
    }
}

const CUSTOMER_COLUMNS: &str =
    "id, name, phone, email, address, zip_code, city, customer_type, status,
     total_value, order_count, favorite_product, last_order_date,
     tags, notes, next_step, created_at";

/// Input for creating a customer
#[derive(Debug, Deserialize)]
pub struct CreateCustomerInput {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: Option<CustomerType>,
    pub status: Option<CustomerStatus>,
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub next_step: Option<String>,
}

/// Input for updating a customer. Derived statistics are not accepted here.
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: Option<CustomerType>,
    pub status: Option<CustomerStatus>,
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub next_step: Option<String>,
}

impl CustomerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateCustomerInput) -> AppResult<Customer> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }
        if let Some(email) = &input.email {
            validate_email(email).map_err(|message| AppError::Validation {
                field: "email".to_string(),
                message: message.to_string(),
            })?;
        }

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            INSERT INTO customers (name, phone, email, address, zip_code, city,
                                   customer_type, status, tags, notes, next_step)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.zip_code)
        .bind(&input.city)
        .bind(input.customer_type.unwrap_or_default().as_str())
        .bind(input.status.unwrap_or_default().as_str())
        .bind(&input.tags)
        .bind(&input.notes)
        .bind(&input.next_step)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    pub async fn update(&self, customer_id: Uuid, input: UpdateCustomerInput) -> AppResult<Customer> {
        if let Some(email) = &input.email {
            validate_email(email).map_err(|message| AppError::Validation {
                field: "email".to_string(),
                message: message.to_string(),
            })?;
        }

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            UPDATE customers SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                email = COALESCE($4, email),
                address = COALESCE($5, address),
                zip_code = COALESCE($6, zip_code),
                city = COALESCE($7, city),
                customer_type = COALESCE($8, customer_type),
                status = COALESCE($9, status),
                tags = COALESCE($10, tags),
                notes = COALESCE($11, notes),
                next_step = COALESCE($12, next_step)
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.zip_code)
        .bind(&input.city)
        .bind(input.customer_type.map(|t| t.as_str()))
        .bind(input.status.map(|s| s.as_str()))
        .bind(&input.tags)
        .bind(&input.notes)
        .bind(&input.next_step)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        Ok(row.into())
    }

    pub async fn get(&self, customer_id: Uuid) -> AppResult<Customer> {
        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        Ok(row.into())
    }

    pub async fn list(&self) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Delete a customer with no orders
    pub async fn delete(&self, customer_id: Uuid) -> AppResult<()> {
        let order_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM orders WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_one(&self.db)
        .await?;

        if order_count > 0 {
            return Err(AppError::Validation {
                field: "customer_id".to_string(),
                message: "Cannot delete a customer with orders".to_string(),
            });
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(customer_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        Ok(())
    }

    /// Recompute the derived statistics block from qualifying orders.
    /// Only Processing, Packed, Shipped and Delivered orders count.
    pub async fn recompute_stats(&self, customer_id: Uuid) -> AppResult<Customer> {
        let (order_count, total_value, last_order_date) =
            sqlx::query_as::<_, (i64, Decimal, Option<DateTime<Utc>>)>(
                r#"
                SELECT COUNT(*), COALESCE(SUM(order_total), 0), MAX(date)
                FROM orders
                WHERE customer_id = $1
                  AND status IN ('Processing', 'Packed', 'Shipped', 'Delivered')
                "#,
            )
            .bind(customer_id)
            .fetch_one(&self.db)
            .await?;

        // Most-bought product by total quantity across qualifying orders
        let favorite_product = sqlx::query_scalar::<_, String>(
            r#"
            SELECT ol.product_name
            FROM order_lines ol
            JOIN orders o ON o.id = ol.order_id
            WHERE o.customer_id = $1
              AND o.status IN ('Processing', 'Packed', 'Shipped', 'Delivered')
            GROUP BY ol.product_name
            ORDER BY SUM(ol.quantity) DESC
            LIMIT 1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?;

        let status = CustomerStatus::derive(order_count, last_order_date, Utc::now());

        let row = sqlx::query_as::<_, CustomerRow>(&format!(
            r#"
            UPDATE customers SET
                total_value = $2,
                order_count = $3,
                favorite_product = $4,
                last_order_date = $5,
                status = $6
            WHERE id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(total_value)
        .bind(order_count)
        .bind(&favorite_product)
        .bind(last_order_date)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        tracing::debug!(
            customer_id = %customer_id,
            order_count,
            status = status.as_str(),
            "Recomputed customer statistics"
        );

        Ok(row.into())
    }

    /// Append an entry to a customer's activity timeline
    pub async fn add_timeline_entry(
        &self,
        customer_id: Uuid,
        kind: TimelineKind,
        description: &str,
    ) -> AppResult<TimelineEntry> {
        let row = sqlx::query_as::<_, TimelineRow>(
            r#"
            INSERT INTO customer_timeline (customer_id, kind, description)
            VALUES ($1, $2, $3)
            RETURNING id, customer_id, date, kind, description
            "#,
        )
        .bind(customer_id)
        .bind(kind.as_str())
        .bind(description)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Timeline entries, newest first
    pub async fn timeline(&self, customer_id: Uuid, limit: i64) -> AppResult<Vec<TimelineEntry>> {
        let rows = sqlx::query_as::<_, TimelineRow>(
            "SELECT id, customer_id, date, kind, description
             FROM customer_timeline
             WHERE customer_id = $1
             ORDER BY date DESC
             LIMIT $2",
        )
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
