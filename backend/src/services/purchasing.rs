//! Purchase order service
//!
//! A purchase increments stock exactly once, at receipt. The receive flow
//! flips the stock_applied flag with a conditional UPDATE inside the same
//! transaction as the ledger increments, so a crash or a concurrent receive
//! can never double-apply and never half-apply.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::automation::LowStockAutomation;
use crate::services::stock::StockService;
use shared::models::{MovementSource, Purchase, PurchaseLine, PurchaseStatus};
use shared::types::PaymentStatus;
use shared::validation::validate_quantity;

#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct PurchaseRow {
    id: Uuid,
    supplier_id: Uuid,
    supplier_name: String,
    date: DateTime<Utc>,
    status: String,
    total_amount: Decimal,
    payment_status: String,
    stock_applied: bool,
    received_at: Option<DateTime<Utc>>,
    notes: Option<String>,
}

impl From<PurchaseRow> for Purchase {
    fn from(row: PurchaseRow) -> Self {
        Purchase {
            id: row.id,
            supplier_id: row.supplier_id,
            supplier_name: row.supplier_name,
            date: row.date,
            status: PurchaseStatus::parse(&row.status).unwrap_or_default(),
            total_amount: row.total_amount,
            payment_status: PaymentStatus::parse(&row.payment_status).unwrap_or_default(),
            stock_applied: row.stock_applied,
            received_at: row.received_at,
            notes: row.notes,
        }
    }
}

#[derive(Debug, FromRow)]
struct PurchaseLineRow {
    id: Uuid,
    purchase_id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    cost_price: Decimal,
}

impl From<PurchaseLineRow> for PurchaseLine {
    fn from(row: PurchaseLineRow) -> Self {
        PurchaseLine {
            id: row.id,
            purchase_id: row.purchase_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            cost_price: row.cost_price,
        }
    }
}

/// Input for one purchase line. Cost defaults to the product's current cost.
#[derive(Debug, Deserialize)]
pub struct PurchaseLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub cost_price: Option<Decimal>,
}

/// Input for creating a purchase
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseInput {
    pub supplier_id: Uuid,
    pub lines: Vec<PurchaseLineInput>,
    pub payment_status: Option<PaymentStatus>,
    pub notes: Option<String>,
}

/// Purchase header with its lines
#[derive(Debug, serde::Serialize)]
pub struct PurchaseWithLines {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub lines: Vec<PurchaseLine>,
}

impl PurchaseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a purchase in Ordered state. Stock is not touched here.
    pub async fn create(&self, input: CreatePurchaseInput) -> AppResult<PurchaseWithLines> {
        if input.lines.is_empty() {
            return Err(AppError::Validation {
                field: "lines".to_string(),
                message: "Purchase must have at least one line".to_string(),
            });
        }

        let supplier_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM suppliers WHERE id = $1",
        )
        .bind(input.supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        let mut tx = self.db.begin().await?;

        // Snapshot product name and cost on each line
        let mut resolved = Vec::with_capacity(input.lines.len());
        let mut total = Decimal::ZERO;
        for line in &input.lines {
            validate_quantity(line.quantity).map_err(|message| AppError::Validation {
                field: "quantity".to_string(),
                message: message.to_string(),
            })?;

            let product = sqlx::query_as::<_, (String, Decimal)>(
                "SELECT name, cost FROM products WHERE id = $1 AND active = TRUE",
            )
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            let cost_price = line.cost_price.unwrap_or(product.1);
            total += cost_price * Decimal::from(line.quantity);
            resolved.push((line.product_id, product.0, line.quantity, cost_price));
        }

        let payment_status = input.payment_status.unwrap_or_default();

        let header = sqlx::query_as::<_, PurchaseRow>(
            r#"
            INSERT INTO purchases (supplier_id, supplier_name, total_amount, payment_status, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, supplier_id, supplier_name, date, status, total_amount,
                      payment_status, stock_applied, received_at, notes
            "#,
        )
        .bind(input.supplier_id)
        .bind(&supplier_name)
        .bind(total)
        .bind(payment_status.as_str())
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(resolved.len());
        for (product_id, product_name, quantity, cost_price) in resolved {
            let row = sqlx::query_as::<_, PurchaseLineRow>(
                r#"
                INSERT INTO purchase_lines (purchase_id, product_id, product_name, quantity, cost_price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, purchase_id, product_id, product_name, quantity, cost_price
                "#,
            )
            .bind(header.id)
            .bind(product_id)
            .bind(&product_name)
            .bind(quantity)
            .bind(cost_price)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(row.into());
        }

        tx.commit().await?;

        tracing::info!(purchase_id = %header.id, supplier = %supplier_name, "Created purchase");

        Ok(PurchaseWithLines {
            purchase: header.into(),
            lines,
        })
    }

    /// Receive a purchase: flip the idempotency flag, increment stock for
    /// every line, all in one transaction. A second receive gets
    /// AlreadyApplied and the ledger is untouched.
    pub async fn receive(&self, purchase_id: Uuid) -> AppResult<PurchaseWithLines> {
        let mut tx = self.db.begin().await?;

        // The conditional UPDATE is the guard: zero rows means the purchase
        // is gone, already received, or was cancelled.
        let header = sqlx::query_as::<_, PurchaseRow>(
            r#"
            UPDATE purchases
            SET stock_applied = TRUE, status = 'Received', received_at = NOW()
            WHERE id = $1 AND stock_applied = FALSE AND status = 'Ordered'
            RETURNING id, supplier_id, supplier_name, date, status, total_amount,
                      payment_status, stock_applied, received_at, notes
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?;

        let header = match header {
            Some(header) => header,
            None => {
                let state = sqlx::query_as::<_, (String, bool)>(
                    "SELECT status, stock_applied FROM purchases WHERE id = $1",
                )
                .bind(purchase_id)
                .fetch_optional(&mut *tx)
                .await?;

                return match state {
                    Some((status, _)) if status == PurchaseStatus::Cancelled.as_str() => {
                        Err(AppError::InvalidStateTransition(
                            "Cannot receive a cancelled purchase".to_string(),
                        ))
                    }
                    Some(_) => Err(AppError::AlreadyApplied(format!(
                        "Purchase {} has already been received",
                        purchase_id
                    ))),
                    None => Err(AppError::NotFound("Purchase".to_string())),
                };
            }
        };

        let lines: Vec<PurchaseLine> = sqlx::query_as::<_, PurchaseLineRow>(
            "SELECT id, purchase_id, product_id, product_name, quantity, cost_price
             FROM purchase_lines WHERE purchase_id = $1",
        )
        .bind(purchase_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

        // Rolling back here leaves the flag unflipped, so the purchase stays
        // receivable once lines are added.
        if lines.is_empty() {
            return Err(AppError::EmptyPurchase(purchase_id));
        }

        let mut affected = Vec::with_capacity(lines.len());
        for line in &lines {
            StockService::ensure_exists_in_tx(&mut tx, line.product_id).await?;
            let record = StockService::apply_delta_in_tx(
                &mut tx,
                line.product_id,
                line.quantity,
                MovementSource::Purchase,
                Some(purchase_id),
                None,
            )
            .await?;
            affected.push(record);
        }

        tx.commit().await?;

        tracing::info!(
            purchase_id = %purchase_id,
            lines = lines.len(),
            "Received purchase and applied stock"
        );

        // Replenishment may close open restock tasks
        let automation = LowStockAutomation::new(self.db.clone());
        for record in &affected {
            automation.on_status_change(record).await?;
        }

        Ok(PurchaseWithLines {
            purchase: header.into(),
            lines,
        })
    }

    /// Cancel a purchase that has not been received
    pub async fn cancel(&self, purchase_id: Uuid) -> AppResult<Purchase> {
        let row = sqlx::query_as::<_, PurchaseRow>(
            r#"
            UPDATE purchases SET status = 'Cancelled'
            WHERE id = $1 AND stock_applied = FALSE
            RETURNING id, supplier_id, supplier_name, date, status, total_amount,
                      payment_status, stock_applied, received_at, notes
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT stock_applied FROM purchases WHERE id = $1",
                )
                .bind(purchase_id)
                .fetch_optional(&self.db)
                .await?;

                match exists {
                    Some(_) => Err(AppError::InvalidStateTransition(
                        "Cannot cancel a received purchase".to_string(),
                    )),
                    None => Err(AppError::NotFound("Purchase".to_string())),
                }
            }
        }
    }

    /// Get a purchase with its lines
    pub async fn get(&self, purchase_id: Uuid) -> AppResult<PurchaseWithLines> {
        let header = sqlx::query_as::<_, PurchaseRow>(
            "SELECT id, supplier_id, supplier_name, date, status, total_amount,
                    payment_status, stock_applied, received_at, notes
             FROM purchases WHERE id = $1",
        )
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let lines = sqlx::query_as::<_, PurchaseLineRow>(
            "SELECT id, purchase_id, product_id, product_name, quantity, cost_price
             FROM purchase_lines WHERE purchase_id = $1",
        )
        .bind(purchase_id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseWithLines {
            purchase: header.into(),
            lines: lines.into_iter().map(Into::into).collect(),
        })
    }

    /// List purchases, newest first
    pub async fn list(&self, limit: i64) -> AppResult<Vec<Purchase>> {
        let rows = sqlx::query_as::<_, PurchaseRow>(
            "SELECT id, supplier_id, supplier_name, date, status, total_amount,
                    payment_status, stock_applied, received_at, notes
             FROM purchases ORDER BY date DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
