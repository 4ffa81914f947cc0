//! Stock ledger service
//!
//! Owns per-product on-hand quantity, threshold and derived status. Every
//! mutation goes through the apply-delta primitive: a single conditional
//! UPDATE so two concurrent fulfillments cannot race between read and write,
//! plus exactly one movement row in the same transaction. A decrement that
//! would take the quantity below zero is rejected outright, never clamped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::automation::LowStockAutomation;
use shared::models::{MovementSource, StockMovement, StockRecord, StockStatus};

/// Stock ledger service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

/// Database row for a stock record
#[derive(Debug, FromRow)]
pub(crate) struct StockRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub min_stock: i32,
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

impl From<StockRow> for StockRecord {
    fn from(row: StockRow) -> Self {
        let status = StockStatus::parse(&row.status)
            .unwrap_or_else(|| StockStatus::derive(row.quantity, row.min_stock));
        StockRecord {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            min_stock: row.min_stock,
            status,
            last_updated: row.last_updated,
        }
    }
}

/// Database row for a stock movement
#[derive(Debug, FromRow)]
struct MovementRow {
    id: Uuid,
    product_id: Uuid,
    delta: i32,
    source: String,
    source_id: Option<Uuid>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<MovementRow> for StockMovement {
    fn from(row: MovementRow) -> Self {
        StockMovement {
            id: row.id,
            product_id: row.product_id,
            delta: row.delta,
            source: MovementSource::parse(&row.source).unwrap_or(MovementSource::Manual),
            source_id: row.source_id,
            note: row.note,
            created_at: row.created_at,
        }
    }
}

/// Stock record joined with catalog info for listing
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockOverview {
    pub product_id: Uuid,
    pub product_name: String,
    pub product_sku: String,
    pub quantity: i32,
    pub min_stock: i32,
    pub status: String,
    pub last_updated: DateTime<Utc>,
}

/// Input for a manual stock adjustment
#[derive(Debug, Deserialize)]
pub struct AdjustStockInput {
    pub product_id: Uuid,
    pub adjustment: i32,
    pub note: Option<String>,
}

/// Input for overriding a stock record
#[derive(Debug, Deserialize)]
pub struct SetStockInput {
    pub quantity: i32,
    pub min_stock: Option<i32>,
}

impl StockService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get the stock record for a product
    pub async fn get(&self, product_id: Uuid) -> AppResult<StockRecord> {
        let row = sqlx::query_as::<_, StockRow>(
            "SELECT id, product_id, quantity, min_stock, status, last_updated
             FROM stock_records WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock record".to_string()))?;

        Ok(row.into())
    }

    /// List all stock records with product info, lowest quantities first
    pub async fn list(&self) -> AppResult<Vec<StockOverview>> {
        let rows = sqlx::query_as::<_, StockOverview>(
            r#"
            SELECT s.product_id, p.name AS product_name, p.sku AS product_sku,
                   s.quantity, s.min_stock, s.status, s.last_updated
            FROM stock_records s
            JOIN products p ON p.id = s.product_id
            WHERE p.active = TRUE
            ORDER BY s.quantity ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Create a zero-quantity record for a product if none exists.
    /// Idempotent; the threshold is taken from the product.
    pub(crate) async fn ensure_exists_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_records (product_id, quantity, min_stock, status)
            SELECT id, 0, min_stock, 'Out' FROM products WHERE id = $1
            ON CONFLICT (product_id) DO NOTHING
            "#,
        )
        .bind(product_id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Apply a signed quantity delta within an existing transaction.
    ///
    /// One conditional UPDATE: the WHERE clause enforces the zero floor at
    /// the storage layer, and the status is recomputed from the post-delta
    /// quantity in the same statement so it can never be observed stale.
    /// Appends exactly one movement row.
    pub(crate) async fn apply_delta_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        delta: i32,
        source: MovementSource,
        source_id: Option<Uuid>,
        note: Option<&str>,
    ) -> AppResult<StockRecord> {
        let row = sqlx::query_as::<_, StockRow>(
            r#"
            UPDATE stock_records
            SET quantity = quantity + $2,
                status = CASE
                    WHEN quantity + $2 = 0 THEN 'Out'
                    WHEN quantity + $2 < min_stock THEN 'Low'
                    ELSE 'OK'
                END,
                last_updated = NOW()
            WHERE product_id = $1 AND quantity + $2 >= 0
            RETURNING id, product_id, quantity, min_stock, status, last_updated
            "#,
        )
        .bind(product_id)
        .bind(delta)
        .fetch_optional(&mut **tx)
        .await?;

        let record: StockRecord = match row {
            Some(row) => row.into(),
            None => {
                // Distinguish a missing record from an insufficient balance
                let available = sqlx::query_scalar::<_, i32>(
                    "SELECT quantity FROM stock_records WHERE product_id = $1",
                )
                .bind(product_id)
                .fetch_optional(&mut **tx)
                .await?;

                return match available {
                    Some(available) => Err(AppError::NegativeStock {
                        product_id,
                        available,
                        requested: -delta,
                    }),
                    None => Err(AppError::NotFound("Stock record".to_string())),
                };
            }
        };

        sqlx::query(
            "INSERT INTO stock_movements (product_id, delta, source, source_id, note)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product_id)
        .bind(delta)
        .bind(source.as_str())
        .bind(source_id)
        .bind(note)
        .execute(&mut **tx)
        .await?;

        Ok(record)
    }

    /// Apply a signed quantity delta in its own transaction
    pub async fn apply_delta(
        &self,
        product_id: Uuid,
        delta: i32,
        source: MovementSource,
        source_id: Option<Uuid>,
        note: Option<&str>,
    ) -> AppResult<StockRecord> {
        let mut tx = self.db.begin().await?;
        let record =
            Self::apply_delta_in_tx(&mut tx, product_id, delta, source, source_id, note).await?;
        tx.commit().await?;
        Ok(record)
    }

    /// Manual stock adjustment: records the correction alongside the
    /// movement, then runs the low-stock check.
    pub async fn adjust(
        &self,
        product_id: Uuid,
        adjustment: i32,
        note: Option<&str>,
        adjusted_by: Uuid,
    ) -> AppResult<StockRecord> {
        if adjustment == 0 {
            return Err(AppError::Validation {
                field: "adjustment".to_string(),
                message: "Adjustment cannot be zero".to_string(),
            });
        }

        let adjustment_id = Uuid::new_v4();
        let mut tx = self.db.begin().await?;

        let record = Self::apply_delta_in_tx(
            &mut tx,
            product_id,
            adjustment,
            MovementSource::Manual,
            Some(adjustment_id),
            note,
        )
        .await?;

        sqlx::query(
            "INSERT INTO stock_adjustments (id, product_id, delta, reason, adjusted_by)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(adjustment_id)
        .bind(product_id)
        .bind(adjustment)
        .bind(note)
        .bind(adjusted_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        LowStockAutomation::new(self.db.clone())
            .on_status_change(&record)
            .await?;

        Ok(record)
    }

    /// Override quantity (and optionally the threshold) for a product.
    /// Recomputes status and leaves a MANUAL movement with the signed
    /// difference.
    pub async fn set_absolute(
        &self,
        product_id: Uuid,
        quantity: i32,
        min_stock: Option<i32>,
    ) -> AppResult<StockRecord> {
        if quantity < 0 {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity cannot be negative".to_string(),
            });
        }
        if let Some(min) = min_stock {
            if min < 0 {
                return Err(AppError::Validation {
                    field: "min_stock".to_string(),
                    message: "Minimum stock cannot be negative".to_string(),
                });
            }
        }

        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, (i32, i32)>(
            "SELECT quantity, min_stock FROM stock_records WHERE product_id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Stock record".to_string()))?;

        let new_min = min_stock.unwrap_or(current.1);
        let status = StockStatus::derive(quantity, new_min);
        let delta = quantity - current.0;

        let row = sqlx::query_as::<_, StockRow>(
            r#"
            UPDATE stock_records
            SET quantity = $2, min_stock = $3, status = $4, last_updated = NOW()
            WHERE product_id = $1
            RETURNING id, product_id, quantity, min_stock, status, last_updated
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(new_min)
        .bind(status.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO stock_movements (product_id, delta, source, note)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(product_id)
        .bind(delta)
        .bind(MovementSource::Manual.as_str())
        .bind("Stock level set manually")
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let record: StockRecord = row.into();

        LowStockAutomation::new(self.db.clone())
            .on_status_change(&record)
            .await?;

        Ok(record)
    }

    /// Movement history, newest first. Write-only elsewhere: there is no
    /// update or delete path for movements.
    pub async fn movements(
        &self,
        product_id: Option<Uuid>,
        limit: i64,
    ) -> AppResult<Vec<StockMovement>> {
        let rows = match product_id {
            Some(product_id) => {
                sqlx::query_as::<_, MovementRow>(
                    "SELECT id, product_id, delta, source, source_id, note, created_at
                     FROM stock_movements
                     WHERE product_id = $1
                     ORDER BY created_at DESC
                     LIMIT $2",
                )
                .bind(product_id)
                .bind(limit)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, MovementRow>(
                    "SELECT id, product_id, delta, source, source_id, note, created_at
                     FROM stock_movements
                     ORDER BY created_at DESC
                     LIMIT $1",
                )
                .bind(limit)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
