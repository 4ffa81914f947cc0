//! Reporting service
//!
//! Read-only aggregates over orders, expenses and the stock ledger. Revenue
//! figures only count orders in qualifying statuses, the same set the
//! customer aggregator uses.

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

const REVENUE_STATUSES: &str = "('Processing', 'Packed', 'Shipped', 'Delivered')";

/// Today's numbers plus current stock health
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub orders_today: i64,
    pub revenue_today: Decimal,
    pub profit_today: Decimal,
    pub average_order_value: Decimal,
    pub open_tasks: i64,
    pub low_stock_products: i64,
    pub inventory_value: Decimal,
}

/// One month's profit and loss
#[derive(Debug, Serialize)]
pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub order_count: i64,
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub other_costs: Decimal,
    pub profit: Decimal,
    pub top_products: Vec<TopProduct>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TopProduct {
    pub product_name: String,
    pub units_sold: i64,
    pub revenue: Decimal,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardReport> {
        let today_start = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt))
            .ok_or_else(|| AppError::Internal("Failed to compute day start".to_string()))?;

        let (orders_today, revenue_today, profit_today) =
            sqlx::query_as::<_, (i64, Decimal, Decimal)>(&format!(
                r#"
                SELECT COUNT(*), COALESCE(SUM(order_total), 0), COALESCE(SUM(profit), 0)
                FROM orders
                WHERE date >= $1 AND status IN {REVENUE_STATUSES}
                "#
            ))
            .bind(today_start)
            .fetch_one(&self.db)
            .await?;

        let average_order_value = if orders_today > 0 {
            (revenue_today / Decimal::from(orders_today)).round_dp(2)
        } else {
            Decimal::ZERO
        };

        let open_tasks = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE status <> 'Done'",
        )
        .fetch_one(&self.db)
        .await?;

        let low_stock_products = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM stock_records s
            JOIN products p ON p.id = s.product_id
            WHERE s.status <> 'OK' AND p.active = TRUE
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let inventory_value = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(s.quantity * p.cost), 0)
            FROM stock_records s
            JOIN products p ON p.id = s.product_id
            WHERE p.active = TRUE
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardReport {
            orders_today,
            revenue_today,
            profit_today,
            average_order_value,
            open_tasks,
            low_stock_products,
            inventory_value,
        })
    }

    pub async fn monthly(&self, year: i32, month: u32) -> AppResult<MonthlyReport> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation {
                field: "month".to_string(),
                message: "Month must be between 1 and 12".to_string(),
            });
        }

        let month_start = Utc
            .with_ymd_and_hms(year, month, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| AppError::Validation {
                field: "year".to_string(),
                message: "Invalid year/month".to_string(),
            })?;
        let next_month = if month == 12 {
            Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
        } else {
            Utc.with_ymd_and_hms(year, month + 1, 1, 0, 0, 0)
        }
        .single()
        .ok_or_else(|| AppError::Internal("Failed to compute month end".to_string()))?;

        let (order_count, revenue, cogs) = sqlx::query_as::<_, (i64, Decimal, Decimal)>(&format!(
            r#"
            SELECT COUNT(*), COALESCE(SUM(order_total), 0), COALESCE(SUM(cost_total), 0)
            FROM orders
            WHERE date >= $1 AND date < $2 AND status IN {REVENUE_STATUSES}
            "#
        ))
        .bind(month_start)
        .bind(next_month)
        .fetch_one(&self.db)
        .await?;

        // COGS is tracked per order line; the expense category of the same
        // name is excluded here to avoid double counting.
        let other_costs = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM expenses
            WHERE date >= $1 AND date < $2 AND category <> 'COGS'
            "#,
        )
        .bind(month_start)
        .bind(next_month)
        .fetch_one(&self.db)
        .await?;

        let top_products = sqlx::query_as::<_, TopProduct>(&format!(
            r#"
            SELECT ol.product_name, SUM(ol.quantity) AS units_sold,
                   COALESCE(SUM(ol.line_total), 0) AS revenue
            FROM order_lines ol
            JOIN orders o ON o.id = ol.order_id
            WHERE o.date >= $1 AND o.date < $2 AND o.status IN {REVENUE_STATUSES}
            GROUP BY ol.product_name
            ORDER BY revenue DESC
            LIMIT 5
            "#
        ))
        .bind(month_start)
        .bind(next_month)
        .fetch_all(&self.db)
        .await?;

        Ok(MonthlyReport {
            year,
            month,
            order_count,
            revenue,
            cogs,
            other_costs,
            profit: revenue - cogs - other_costs,
            top_products,
        })
    }
}
