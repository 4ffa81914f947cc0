//! Order models and line/header math
//!
//! Line and header totals are derived, never hand-edited. The math lives
//! here so the backend and its tests share one definition.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::PaymentStatus;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    Processing,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
    Refund,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::Processing => "Processing",
            OrderStatus::Packed => "Packed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refund => "Refund",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "New" => Some(OrderStatus::New),
            "Processing" => Some(OrderStatus::Processing),
            "Packed" => Some(OrderStatus::Packed),
            "Shipped" => Some(OrderStatus::Shipped),
            "Delivered" => Some(OrderStatus::Delivered),
            "Cancelled" => Some(OrderStatus::Cancelled),
            "Refund" => Some(OrderStatus::Refund),
            _ => None,
        }
    }

    /// Statuses whose orders count toward customer revenue statistics
    pub fn counts_toward_revenue(&self) -> bool {
        matches!(
            self,
            OrderStatus::Processing
                | OrderStatus::Packed
                | OrderStatus::Shipped
                | OrderStatus::Delivered
        )
    }

    /// The completion transition that closes out fulfillment
    pub fn is_completion(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }

    /// Cancelled and Refund are terminal. A delivered order can only move
    /// on to Refund; it never re-enters fulfillment.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            OrderStatus::Cancelled | OrderStatus::Refund => false,
            OrderStatus::Delivered => matches!(next, OrderStatus::Refund),
            _ => true,
        }
    }
}

/// Sales channel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Channel {
    Shopify,
    TikTok,
    Instagram,
    #[default]
    Direct,
    Campaign,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Shopify => "Shopify",
            Channel::TikTok => "TikTok",
            Channel::Instagram => "Instagram",
            Channel::Direct => "Direct",
            Channel::Campaign => "Campaign",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Shopify" => Some(Channel::Shopify),
            "TikTok" => Some(Channel::TikTok),
            "Instagram" => Some(Channel::Instagram),
            "Direct" => Some(Channel::Direct),
            "Campaign" => Some(Channel::Campaign),
            _ => None,
        }
    }
}

/// Order header with derived totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub date: DateTime<Utc>,
    pub channel: Channel,
    pub status: OrderStatus,
    pub shipping_paid_by_customer: Decimal,
    pub shipping_cost: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub order_total: Decimal,
    pub cost_total: Decimal,
    pub profit: Decimal,
    pub profit_percent: Decimal,
    /// Idempotency guard: the order's stock effect is applied at most once
    pub stock_applied: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// One line of an order, with derived line totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub sale_price: Decimal,
    pub cost_price: Decimal,
    pub discount: Decimal,
    pub line_total: Decimal,
    pub line_profit: Decimal,
}

/// Derived totals for a single order line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotals {
    pub line_total: Decimal,
    pub line_profit: Decimal,
}

/// Compute line totals: `line_total = sale_price * quantity - discount`,
/// `line_profit = line_total - cost_price * quantity`.
pub fn compute_line_totals(
    sale_price: Decimal,
    cost_price: Decimal,
    quantity: i32,
    discount: Decimal,
) -> LineTotals {
    let qty = Decimal::from(quantity);
    let line_total = sale_price * qty - discount;
    let line_profit = line_total - cost_price * qty;
    LineTotals {
        line_total,
        line_profit,
    }
}

/// Derived totals for an order header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OrderTotals {
    pub order_total: Decimal,
    pub cost_total: Decimal,
    pub profit: Decimal,
    pub profit_percent: Decimal,
}

impl OrderTotals {
    /// Aggregate line totals into header totals. A zero order total yields a
    /// zero profit percentage rather than a division fault.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (&'a LineTotals, i32, Decimal)>,
    {
        let mut order_total = Decimal::ZERO;
        let mut cost_total = Decimal::ZERO;
        for (totals, quantity, cost_price) in lines {
            order_total += totals.line_total;
            cost_total += cost_price * Decimal::from(quantity);
        }
        let profit = order_total - cost_total;
        let profit_percent = if order_total.is_zero() {
            Decimal::ZERO
        } else {
            (profit / order_total * Decimal::from(100)).round_dp(2)
        };
        Self {
            order_total,
            cost_total,
            profit,
            profit_percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn line_totals_with_discount() {
        let t = compute_line_totals(dec("299.0"), dec("89.0"), 2, dec("50.0"));
        assert_eq!(t.line_total, dec("548.0"));
        assert_eq!(t.line_profit, dec("370.0"));
    }

    #[test]
    fn header_totals_sum_lines() {
        let l1 = compute_line_totals(dec("100"), dec("40"), 3, Decimal::ZERO);
        let l2 = compute_line_totals(dec("200"), dec("80"), 1, dec("20"));
        let totals = OrderTotals::from_lines([(&l1, 3, dec("40")), (&l2, 1, dec("80"))]);
        assert_eq!(totals.order_total, dec("480"));
        assert_eq!(totals.cost_total, dec("200"));
        assert_eq!(totals.profit, dec("280"));
    }

    #[test]
    fn zero_total_order_has_zero_profit_percent() {
        let totals = OrderTotals::from_lines([]);
        assert_eq!(totals.profit_percent, Decimal::ZERO);
    }

    #[test]
    fn revenue_statuses() {
        assert!(OrderStatus::Processing.counts_toward_revenue());
        assert!(OrderStatus::Delivered.counts_toward_revenue());
        assert!(!OrderStatus::New.counts_toward_revenue());
        assert!(!OrderStatus::Cancelled.counts_toward_revenue());
        assert!(!OrderStatus::Refund.counts_toward_revenue());
    }

    #[test]
    fn delivered_only_moves_to_refund() {
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Refund));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::New));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn terminal_statuses_accept_no_transition() {
        for next in [
            OrderStatus::New,
            OrderStatus::Processing,
            OrderStatus::Delivered,
        ] {
            assert!(!OrderStatus::Cancelled.can_transition_to(next));
            assert!(!OrderStatus::Refund.can_transition_to(next));
        }
    }

    #[test]
    fn open_statuses_move_freely() {
        assert!(OrderStatus::New.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Packed));
    }
}
