//! Product catalog service
//!
//! Creating a product provisions its stock record in the same transaction.
//! SKUs are unique and immutable; products referenced by history are
//! deactivated rather than deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;
use shared::models::{Product, DEFAULT_MIN_STOCK};
use shared::validation::{validate_money, validate_sku};

#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    sku: String,
    name: String,
    category: String,
    cost: Decimal,
    price: Decimal,
    min_stock: i32,
    description: Option<String>,
    supplier_id: Option<Uuid>,
    active: bool,
    color: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            category: row.category,
            cost: row.cost,
            price: row.price,
            min_stock: row.min_stock,
            description: row.description,
            supplier_id: row.supplier_id,
            active: row.active,
            color: row.color,
            created_at: row.created_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "id, sku, name, category, cost, price, min_stock, description,
     supplier_id, active, color, created_at";

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub cost: Decimal,
    pub price: Decimal,
    pub min_stock: Option<i32>,
    pub description: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub color: Option<String>,
}

/// Input for updating a product. The SKU is deliberately absent.
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub category: Option<String>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
    pub min_stock: Option<i32>,
    pub description: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub color: Option<String>,
}

impl ProductService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_sku(&input.sku).map_err(|message| AppError::Validation {
            field: "sku".to_string(),
            message: message.to_string(),
        })?;
        for (field, amount) in [("cost", input.cost), ("price", input.price)] {
            validate_money(amount).map_err(|message| AppError::Validation {
                field: field.to_string(),
                message: message.to_string(),
            })?;
        }
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }

        let sku_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE sku = $1)",
        )
        .bind(&input.sku)
        .fetch_one(&self.db)
        .await?;

        if sku_taken {
            return Err(AppError::DuplicateEntry(format!(
                "A product with SKU {} already exists",
                input.sku
            )));
        }

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (sku, name, category, cost, price, min_stock,
                                  description, supplier_id, color)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&input.sku)
        .bind(input.name.trim())
        .bind(&input.category)
        .bind(input.cost)
        .bind(input.price)
        .bind(input.min_stock.unwrap_or(DEFAULT_MIN_STOCK))
        .bind(&input.description)
        .bind(input.supplier_id)
        .bind(&input.color)
        .fetch_one(&mut *tx)
        .await?;

        StockService::ensure_exists_in_tx(&mut tx, row.id).await?;

        tx.commit().await?;

        tracing::info!(product_id = %row.id, sku = %row.sku, "Created product");

        Ok(row.into())
    }

    /// Update catalog fields. A new threshold is propagated to the stock
    /// record so the next ledger mutation derives status against it.
    pub async fn update(&self, product_id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        for (field, amount) in [("cost", input.cost), ("price", input.price)] {
            if let Some(amount) = amount {
                validate_money(amount).map_err(|message| AppError::Validation {
                    field: field.to_string(),
                    message: message.to_string(),
                })?;
            }
        }

        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                cost = COALESCE($4, cost),
                price = COALESCE($5, price),
                min_stock = COALESCE($6, min_stock),
                description = COALESCE($7, description),
                supplier_id = COALESCE($8, supplier_id),
                color = COALESCE($9, color)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.cost)
        .bind(input.price)
        .bind(input.min_stock)
        .bind(&input.description)
        .bind(input.supplier_id)
        .bind(&input.color)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        if let Some(min_stock) = input.min_stock {
            sqlx::query(
                r#"
                UPDATE stock_records
                SET min_stock = $2,
                    status = CASE
                        WHEN quantity = 0 THEN 'Out'
                        WHEN quantity < $2 THEN 'Low'
                        ELSE 'OK'
                    END
                WHERE product_id = $1
                "#,
            )
            .bind(product_id)
            .bind(min_stock)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    pub async fn get(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }

    /// List products; inactive ones only when asked for
    pub async fn list(&self, include_inactive: bool) -> AppResult<Vec<Product>> {
        let rows = if include_inactive {
            sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
            ))
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query_as::<_, ProductRow>(&format!(
                "SELECT {PRODUCT_COLUMNS} FROM products WHERE active = TRUE ORDER BY name"
            ))
            .fetch_all(&self.db)
            .await?
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Soft delete: history keeps its snapshots, the product just stops
    /// appearing in the catalog and cannot be ordered.
    pub async fn deactivate(&self, product_id: Uuid) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET active = FALSE WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(row.into())
    }
}
