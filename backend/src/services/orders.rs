//! Order service
//!
//! Orders decrement stock at creation: header, lines and every ledger
//! decrement commit in one transaction with stock_applied already set, so an
//! order either exists fully paid for in stock terms or not at all. Orders
//! that predate this policy carry stock_applied = false and are caught up at
//! delivery through the same conditional-flip guard purchases use.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::automation::LowStockAutomation;
use crate::services::customers::CustomerService;
use crate::services::notification::EmailClient;
use crate::services::stock::StockService;
use shared::models::{
    compute_line_totals, Channel, LineTotals, MovementSource, Order, OrderLine, OrderStatus,
    OrderTotals, StockRecord, TaskPriority, TaskStatus, TaskType, TimelineKind,
    FOLLOW_UP_DUE_DAYS,
};
use shared::types::PaymentStatus;
use shared::validation::{validate_discount, validate_quantity};

#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    customer_name: String,
    date: DateTime<Utc>,
    channel: String,
    status: String,
    shipping_paid_by_customer: Decimal,
    shipping_cost: Decimal,
    payment_status: String,
    payment_method: Option<String>,
    payment_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    order_total: Decimal,
    cost_total: Decimal,
    profit: Decimal,
    profit_percent: Decimal,
    stock_applied: bool,
    completed_at: Option<DateTime<Utc>>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            date: row.date,
            channel: Channel::parse(&row.channel).unwrap_or_default(),
            status: OrderStatus::parse(&row.status).unwrap_or(OrderStatus::New),
            shipping_paid_by_customer: row.shipping_paid_by_customer,
            shipping_cost: row.shipping_cost,
            payment_status: PaymentStatus::parse(&row.payment_status).unwrap_or_default(),
            payment_method: row.payment_method,
            payment_date: row.payment_date,
            notes: row.notes,
            order_total: row.order_total,
            cost_total: row.cost_total,
            profit: row.profit,
            profit_percent: row.profit_percent,
            stock_applied: row.stock_applied,
            completed_at: row.completed_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    quantity: i32,
    sale_price: Decimal,
    cost_price: Decimal,
    discount: Decimal,
    line_total: Decimal,
    line_profit: Decimal,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        OrderLine {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            sale_price: row.sale_price,
            cost_price: row.cost_price,
            discount: row.discount,
            line_total: row.line_total,
            line_profit: row.line_profit,
        }
    }
}

const ORDER_COLUMNS: &str =
    "id, customer_id, customer_name, date, channel, status,
     shipping_paid_by_customer, shipping_cost, payment_status, payment_method,
     payment_date, notes, order_total, cost_total, profit, profit_percent,
     stock_applied, completed_at";

const ORDER_LINE_COLUMNS: &str =
    "id, order_id, product_id, product_name, quantity, sale_price, cost_price,
     discount, line_total, line_profit";

/// Input for one order line. Sale price defaults to the product's list
/// price, discount to zero.
#[derive(Debug, Deserialize)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
    pub sale_price: Option<Decimal>,
    pub discount: Option<Decimal>,
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub customer_id: Uuid,
    pub lines: Vec<OrderLineInput>,
    pub channel: Option<Channel>,
    pub shipping_paid_by_customer: Option<Decimal>,
    pub shipping_cost: Option<Decimal>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

/// Input for a status transition
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusInput {
    pub status: OrderStatus,
}

/// Order header with its lines
#[derive(Debug, serde::Serialize)]
pub struct OrderWithLines {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

impl OrderService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an order and decrement stock for every line atomically.
    /// Any line short on stock rejects the whole order.
    pub async fn create(&self, input: CreateOrderInput) -> AppResult<OrderWithLines> {
        if input.lines.is_empty() {
            return Err(AppError::EmptyOrder);
        }

        let customer_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM customers WHERE id = $1",
        )
        .bind(input.customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        let mut tx = self.db.begin().await?;

        // Resolve each line: snapshot name/prices, derive line totals
        struct ResolvedLine {
            product_id: Uuid,
            product_name: String,
            quantity: i32,
            sale_price: Decimal,
            cost_price: Decimal,
            discount: Decimal,
            line_total: Decimal,
            line_profit: Decimal,
        }

        let mut resolved = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            validate_quantity(line.quantity).map_err(|message| AppError::Validation {
                field: "quantity".to_string(),
                message: message.to_string(),
            })?;

            let (name, price, cost) = sqlx::query_as::<_, (String, Decimal, Decimal)>(
                "SELECT name, price, cost FROM products WHERE id = $1 AND active = TRUE",
            )
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            let sale_price = line.sale_price.unwrap_or(price);
            let discount = line.discount.unwrap_or(Decimal::ZERO);
            validate_discount(sale_price, line.quantity, discount).map_err(|message| {
                AppError::Validation {
                    field: "discount".to_string(),
                    message: message.to_string(),
                }
            })?;

            let totals = compute_line_totals(sale_price, cost, line.quantity, discount);
            resolved.push(ResolvedLine {
                product_id: line.product_id,
                product_name: name,
                quantity: line.quantity,
                sale_price,
                cost_price: cost,
                discount,
                line_total: totals.line_total,
                line_profit: totals.line_profit,
            });
        }

        let line_totals: Vec<(LineTotals, i32, Decimal)> = resolved
            .iter()
            .map(|l| {
                (
                    LineTotals {
                        line_total: l.line_total,
                        line_profit: l.line_profit,
                    },
                    l.quantity,
                    l.cost_price,
                )
            })
            .collect();
        let totals = OrderTotals::from_lines(line_totals.iter().map(|(t, q, c)| (t, *q, *c)));

        // stock_applied is set up front: this transaction carries the
        // decrements, so the flag and the ledger commit together.
        let header = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            INSERT INTO orders (customer_id, customer_name, channel, status,
                                shipping_paid_by_customer, shipping_cost,
                                payment_status, payment_method, notes,
                                order_total, cost_total, profit, profit_percent,
                                stock_applied)
            VALUES ($1, $2, $3, 'New', $4, $5, $6, $7, $8, $9, $10, $11, $12, TRUE)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(input.customer_id)
        .bind(&customer_name)
        .bind(input.channel.unwrap_or_default().as_str())
        .bind(input.shipping_paid_by_customer.unwrap_or(Decimal::ZERO))
        .bind(input.shipping_cost.unwrap_or(Decimal::ZERO))
        .bind(input.payment_status.unwrap_or_default().as_str())
        .bind(&input.payment_method)
        .bind(&input.notes)
        .bind(totals.order_total)
        .bind(totals.cost_total)
        .bind(totals.profit)
        .bind(totals.profit_percent)
        .fetch_one(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(resolved.len());
        let mut affected: Vec<StockRecord> = Vec::with_capacity(resolved.len());
        for line in &resolved {
            let row = sqlx::query_as::<_, OrderLineRow>(&format!(
                r#"
                INSERT INTO order_lines (order_id, product_id, product_name, quantity,
                                         sale_price, cost_price, discount,
                                         line_total, line_profit)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                RETURNING {ORDER_LINE_COLUMNS}
                "#
            ))
            .bind(header.id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.sale_price)
            .bind(line.cost_price)
            .bind(line.discount)
            .bind(line.line_total)
            .bind(line.line_profit)
            .fetch_one(&mut *tx)
            .await?;
            lines.push(OrderLine::from(row));

            let record = StockService::apply_delta_in_tx(
                &mut tx,
                line.product_id,
                -line.quantity,
                MovementSource::Order,
                Some(header.id),
                None,
            )
            .await?;
            affected.push(record);
        }

        tx.commit().await?;

        let order = Order::from(header);
        tracing::info!(
            order_id = %order.id,
            customer = %customer_name,
            total = %order.order_total,
            "Created order"
        );

        // Post-commit side effects: automation, statistics, timeline, email
        let automation = LowStockAutomation::new(self.db.clone());
        for record in &affected {
            automation.on_status_change(record).await?;
        }

        let customers = CustomerService::new(self.db.clone());
        customers.recompute_stats(order.customer_id).await?;
        customers
            .add_timeline_entry(
                order.customer_id,
                TimelineKind::Order,
                &format!("Order placed for {} kr", order.order_total),
            )
            .await?;

        if let Some(client) = EmailClient::from_env() {
            let order_id = order.id.to_string();
            let total = order.order_total;
            let name = customer_name.clone();
            tokio::spawn(async move {
                if let Err(e) = client.send_new_order_alert(&order_id, &name, total).await {
                    tracing::warn!("Failed to send new order alert: {}", e);
                }
            });
        }

        Ok(OrderWithLines { order, lines })
    }

    /// Transition an order to a new status.
    ///
    /// Delivery stamps completed_at, spawns the customer follow-up task and,
    /// for legacy orders that never decremented stock, applies the decrement
    /// behind the same conditional flip the creation path relies on.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let current_status = OrderStatus::parse(&current.status).unwrap_or(OrderStatus::New);
        if !current_status.can_transition_to(new_status) {
            return Err(AppError::InvalidStateTransition(format!(
                "Cannot move a {} order to {}",
                current_status.as_str(),
                new_status.as_str()
            )));
        }

        let mut affected: Vec<StockRecord> = Vec::new();

        if new_status.is_completion() && !current.stock_applied {
            // Legacy fallback: the flip guard makes the catch-up exactly-once
            let flipped = sqlx::query(
                "UPDATE orders SET stock_applied = TRUE WHERE id = $1 AND stock_applied = FALSE",
            )
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

            if flipped.rows_affected() == 1 {
                let lines = sqlx::query_as::<_, (Uuid, i32)>(
                    "SELECT product_id, quantity FROM order_lines WHERE order_id = $1",
                )
                .bind(order_id)
                .fetch_all(&mut *tx)
                .await?;

                for (product_id, quantity) in lines {
                    let record = StockService::apply_delta_in_tx(
                        &mut tx,
                        product_id,
                        -quantity,
                        MovementSource::Order,
                        Some(order_id),
                        None,
                    )
                    .await?;
                    affected.push(record);
                }
            }
        }

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            r#"
            UPDATE orders
            SET status = $2,
                completed_at = CASE WHEN $3 THEN NOW() ELSE completed_at END
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(new_status.as_str())
        .bind(new_status.is_completion())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        let order = Order::from(row);
        tracing::info!(
            order_id = %order_id,
            from = current_status.as_str(),
            to = new_status.as_str(),
            "Order status updated"
        );

        let automation = LowStockAutomation::new(self.db.clone());
        for record in &affected {
            automation.on_status_change(record).await?;
        }

        let customers = CustomerService::new(self.db.clone());
        customers.recompute_stats(order.customer_id).await?;

        if new_status.is_completion() && !current_status.is_completion() {
            self.spawn_follow_up(&order).await?;
            customers
                .add_timeline_entry(
                    order.customer_id,
                    TimelineKind::Order,
                    &format!("Order delivered ({} kr)", order.order_total),
                )
                .await?;
        }

        Ok(order)
    }

    /// Follow-up task a week after delivery
    async fn spawn_follow_up(&self, order: &Order) -> AppResult<()> {
        let due = Utc::now() + chrono::Duration::days(FOLLOW_UP_DUE_DAYS);
        sqlx::query(
            r#"
            INSERT INTO tasks (title, description, task_type, priority, status,
                               due_date, customer_id, order_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(format!("Follow up with {}", order.customer_name))
        .bind("Check in after delivery and ask for a review.")
        .bind(TaskType::Customer.as_str())
        .bind(TaskPriority::Low.as_str())
        .bind(TaskStatus::Planned.as_str())
        .bind(due)
        .bind(order.customer_id)
        .bind(order.id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Get an order with its lines
    pub async fn get(&self, order_id: Uuid) -> AppResult<OrderWithLines> {
        let header = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let lines = sqlx::query_as::<_, OrderLineRow>(&format!(
            "SELECT {ORDER_LINE_COLUMNS} FROM order_lines WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderWithLines {
            order: header.into(),
            lines: lines.into_iter().map(Into::into).collect(),
        })
    }

    /// List orders, newest first, optionally filtered by status
    pub async fn list(&self, status: Option<OrderStatus>, limit: i64) -> AppResult<Vec<Order>> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1
                     ORDER BY date DESC LIMIT $2"
                ))
                .bind(status.as_str())
                .bind(limit)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY date DESC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Orders for one customer, newest first
    pub async fn list_for_customer(&self, customer_id: Uuid) -> AppResult<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE customer_id = $1 ORDER BY date DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
