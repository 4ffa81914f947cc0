//! Demo data seeding for development environments

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;

#[derive(Clone)]
pub struct SeedService {
    db: PgPool,
}

#[derive(Debug, serde::Serialize)]
pub struct SeedSummary {
    pub suppliers: usize,
    pub products: usize,
    pub customers: usize,
}

fn kr(value: i64) -> Decimal {
    Decimal::from(value)
}

impl SeedService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Seed a demo catalog, suppliers and customers. Refuses to run twice.
    pub async fn run(&self) -> AppResult<SeedSummary> {
        let already_seeded = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products)",
        )
        .fetch_one(&self.db)
        .await?;

        if already_seeded {
            return Err(AppError::Validation {
                field: "seed".to_string(),
                message: "Database already contains data".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let suppliers = [
            ("NutriSupply AS", "Oslo", "post@nutrisupply.no"),
            ("Nordic Health Import", "Bergen", "kontakt@nordichealth.no"),
        ];
        let mut supplier_ids = Vec::new();
        for (name, city, email) in suppliers {
            let id = sqlx::query_scalar::<_, Uuid>(
                "INSERT INTO suppliers (name, address, email) VALUES ($1, $2, $3) RETURNING id",
            )
            .bind(name)
            .bind(city)
            .bind(email)
            .fetch_one(&mut *tx)
            .await?;
            supplier_ids.push(id);
        }

        // (sku, name, category, cost, price, min_stock, color, supplier index)
        let products = [
            ("ZV-OM3-001", "Omega-3 Premium", "Fatty acids", 89, 299, 80, "omega", 0),
            ("ZV-D3K2-001", "Vitamin D3 + K2", "Vitamins", 65, 249, 80, "d3", 0),
            ("ZV-MAG-001", "Magnesium Complex", "Minerals", 55, 219, 80, "mag", 1),
            ("ZV-MULTI-001", "Multivitamin Daily", "Vitamins", 72, 279, 60, "multi", 1),
        ];
        let mut product_count = 0;
        for (sku, name, category, cost, price, min_stock, color, supplier) in products {
            let product_id = sqlx::query_scalar::<_, Uuid>(
                r#"
                INSERT INTO products (sku, name, category, cost, price, min_stock, color, supplier_id)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id
                "#,
            )
            .bind(sku)
            .bind(name)
            .bind(category)
            .bind(kr(cost))
            .bind(kr(price))
            .bind(min_stock)
            .bind(color)
            .bind(supplier_ids[supplier])
            .fetch_one(&mut *tx)
            .await?;

            StockService::ensure_exists_in_tx(&mut tx, product_id).await?;
            product_count += 1;
        }

        let customers = [
            ("Kari Nordmann", "Oslo", "kari@example.no"),
            ("Ola Hansen", "Trondheim", "ola@example.no"),
            ("Treningssenter Vest AS", "Stavanger", "innkjop@tsvest.no"),
        ];
        for (name, city, email) in customers {
            sqlx::query("INSERT INTO customers (name, city, email) VALUES ($1, $2, $3)")
                .bind(name)
                .bind(city)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!("Seeded demo data");

        Ok(SeedSummary {
            suppliers: supplier_ids.len(),
            products: product_count,
            customers: customers.len(),
        })
    }
}
