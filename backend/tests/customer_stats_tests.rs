//! Customer statistics aggregator tests
//!
//! The aggregator recomputes a customer's derived block from qualifying
//! orders and overwrites it whole. These tests replay the aggregation over
//! an in-memory order list using the same status predicate and tier
//! derivation the service queries encode.

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{CustomerStatus, OrderStatus};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

struct SimOrder {
    status: OrderStatus,
    date: DateTime<Utc>,
    order_total: Decimal,
    lines: Vec<(String, i32)>,
}

#[derive(Debug, PartialEq)]
struct StatsBlock {
    order_count: i64,
    total_value: Decimal,
    last_order_date: Option<DateTime<Utc>>,
    favorite_product: Option<String>,
    status: CustomerStatus,
}

/// Mirror of the aggregation queries: count, sum and max over qualifying
/// orders, favorite product by total units across their lines.
fn aggregate(orders: &[SimOrder], now: DateTime<Utc>) -> StatsBlock {
    let qualifying: Vec<&SimOrder> = orders
        .iter()
        .filter(|o| o.status.counts_toward_revenue())
        .collect();

    let order_count = qualifying.len() as i64;
    let total_value = qualifying.iter().map(|o| o.order_total).sum();
    let last_order_date = qualifying.iter().map(|o| o.date).max();

    let mut units: std::collections::HashMap<&str, i64> = std::collections::HashMap::new();
    for order in &qualifying {
        for (name, quantity) in &order.lines {
            *units.entry(name.as_str()).or_insert(0) += i64::from(*quantity);
        }
    }
    let favorite_product = units
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(name, _)| name.to_string());

    StatsBlock {
        order_count,
        total_value,
        last_order_date,
        favorite_product,
        status: CustomerStatus::derive(order_count, last_order_date, now),
    }
}

fn order(status: OrderStatus, days_ago: i64, total: &str, lines: &[(&str, i32)]) -> SimOrder {
    SimOrder {
        status,
        date: Utc::now() - Duration::days(days_ago),
        order_total: dec(total),
        lines: lines.iter().map(|(n, q)| (n.to_string(), *q)).collect(),
    }
}

#[test]
fn cancelled_and_refunded_orders_do_not_count() {
    let now = Utc::now();
    let orders = [
        order(OrderStatus::Delivered, 5, "299.00", &[("Omega-3 Premium", 1)]),
        order(OrderStatus::Cancelled, 3, "500.00", &[("Omega-3 Premium", 2)]),
        order(OrderStatus::Refund, 2, "249.00", &[("Vitamin D3+K2", 1)]),
    ];
    let stats = aggregate(&orders, now);
    assert_eq!(stats.order_count, 1);
    assert_eq!(stats.total_value, dec("299.00"));
}

#[test]
fn new_orders_await_processing_before_counting() {
    let now = Utc::now();
    let orders = [order(OrderStatus::New, 1, "299.00", &[("Omega-3 Premium", 1)])];
    let stats = aggregate(&orders, now);
    assert_eq!(stats.order_count, 0);
    assert_eq!(stats.status, CustomerStatus::New);
    assert_eq!(stats.last_order_date, None);
}

#[test]
fn favorite_product_is_by_units_not_order_count() {
    let now = Utc::now();
    // Two orders with one D3 each, one order with three Omega-3
    let orders = [
        order(OrderStatus::Delivered, 10, "249.00", &[("Vitamin D3+K2", 1)]),
        order(OrderStatus::Delivered, 8, "249.00", &[("Vitamin D3+K2", 1)]),
        order(OrderStatus::Delivered, 5, "897.00", &[("Omega-3 Premium", 3)]),
    ];
    let stats = aggregate(&orders, now);
    assert_eq!(stats.favorite_product.as_deref(), Some("Omega-3 Premium"));
}

#[test]
fn last_order_date_is_max_of_qualifying() {
    let now = Utc::now();
    let recent_cancelled = order(OrderStatus::Cancelled, 1, "100.00", &[]);
    let older_delivered = order(OrderStatus::Delivered, 30, "100.00", &[]);
    let expected = older_delivered.date;
    let stats = aggregate(&[recent_cancelled, older_delivered], now);
    assert_eq!(stats.last_order_date, Some(expected));
}

#[test]
fn tenth_qualifying_order_promotes_to_vip() {
    let now = Utc::now();
    let mut orders: Vec<SimOrder> = (0..9)
        .map(|i| order(OrderStatus::Delivered, 200 + i, "100.00", &[]))
        .collect();
    assert_eq!(aggregate(&orders, now).status, CustomerStatus::Inactive);

    orders.push(order(OrderStatus::Delivered, 199, "100.00", &[]));
    assert_eq!(aggregate(&orders, now).status, CustomerStatus::Vip);
}

#[test]
fn recompute_overwrites_stale_block() {
    let now = Utc::now();
    let mut orders = vec![order(
        OrderStatus::Delivered,
        5,
        "299.00",
        &[("Omega-3 Premium", 1)],
    )];
    let first = aggregate(&orders, now);
    assert_eq!(first.favorite_product.as_deref(), Some("Omega-3 Premium"));

    // The order is refunded: the whole block reverts, nothing lingers
    orders[0].status = OrderStatus::Refund;
    let second = aggregate(&orders, now);
    assert_eq!(
        second,
        StatsBlock {
            order_count: 0,
            total_value: Decimal::ZERO,
            last_order_date: None,
            favorite_product: None,
            status: CustomerStatus::New,
        }
    );
}

fn status_strategy() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::New),
        Just(OrderStatus::Processing),
        Just(OrderStatus::Packed),
        Just(OrderStatus::Shipped),
        Just(OrderStatus::Delivered),
        Just(OrderStatus::Cancelled),
        Just(OrderStatus::Refund),
    ]
}

proptest! {
    /// Total value only ever includes qualifying orders.
    #[test]
    fn total_value_matches_qualifying_sum(
        specs in prop::collection::vec((status_strategy(), 0i64..400, 1u32..5000), 0..20),
    ) {
        let now = Utc::now();
        let orders: Vec<SimOrder> = specs
            .iter()
            .map(|(status, days_ago, total)| SimOrder {
                status: *status,
                date: now - Duration::days(*days_ago),
                order_total: Decimal::from(*total),
                lines: vec![],
            })
            .collect();

        let expected: Decimal = orders
            .iter()
            .filter(|o| o.status.counts_toward_revenue())
            .map(|o| o.order_total)
            .sum();
        prop_assert_eq!(aggregate(&orders, now).total_value, expected);
    }

    /// The derived tier is never the manually assigned Lead or Lost.
    #[test]
    fn derived_tier_is_never_manual(
        specs in prop::collection::vec((status_strategy(), 0i64..400), 0..20),
    ) {
        let now = Utc::now();
        let orders: Vec<SimOrder> = specs
            .iter()
            .map(|(status, days_ago)| SimOrder {
                status: *status,
                date: now - Duration::days(*days_ago),
                order_total: Decimal::ONE,
                lines: vec![],
            })
            .collect();
        let tier = aggregate(&orders, now).status;
        prop_assert!(tier != CustomerStatus::Lead);
        prop_assert!(tier != CustomerStatus::Lost);
    }

    /// Aggregation is a pure function of the order list.
    #[test]
    fn recompute_is_deterministic(
        specs in prop::collection::vec((status_strategy(), 0i64..400, 1u32..5000), 0..20),
    ) {
        let now = Utc::now();
        let orders: Vec<SimOrder> = specs
            .iter()
            .map(|(status, days_ago, total)| SimOrder {
                status: *status,
                date: now - Duration::days(*days_ago),
                order_total: Decimal::from(*total),
                lines: vec![],
            })
            .collect();
        prop_assert_eq!(aggregate(&orders, now), aggregate(&orders, now));
    }
}
