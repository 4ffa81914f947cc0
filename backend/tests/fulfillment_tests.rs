//! Purchase and order fulfillment tests
//!
//! The workflows that move stock share two guards: the stock_applied flag
//! makes each document's stock effect exactly-once, and multi-line documents
//! apply all lines or none. These tests drive an in-memory simulation built
//! on the same derivation functions the services use.

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::{OrderStatus, PurchaseStatus, StockStatus};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ============================================================================
// Fulfillment simulation
// ============================================================================

type ProductId = u32;

/// Mirrors the stock table plus the per-document idempotency flags
struct FulfillmentSim {
    stock: HashMap<ProductId, i32>,
    min_stock: i32,
    applied: HashMap<u64, bool>,
    cancelled: HashSet<u64>,
}

#[derive(Debug, PartialEq)]
enum SimError {
    AlreadyApplied,
    NegativeStock,
    EmptyDocument,
    CancelledDocument,
}

impl FulfillmentSim {
    fn new(min_stock: i32) -> Self {
        Self {
            stock: HashMap::new(),
            min_stock,
            applied: HashMap::new(),
            cancelled: HashSet::new(),
        }
    }

    fn set_stock(&mut self, product: ProductId, quantity: i32) {
        self.stock.insert(product, quantity);
    }

    fn quantity(&self, product: ProductId) -> i32 {
        *self.stock.get(&product).unwrap_or(&0)
    }

    fn status(&self, product: ProductId) -> StockStatus {
        StockStatus::derive(self.quantity(product), self.min_stock)
    }

    /// Receive a purchase: flip the flag, then increment every line. The
    /// whole step rolls back if any part fails.
    fn receive_purchase(
        &mut self,
        purchase_id: u64,
        lines: &[(ProductId, i32)],
    ) -> Result<(), SimError> {
        if self.cancelled.contains(&purchase_id) {
            return Err(SimError::CancelledDocument);
        }
        if *self.applied.get(&purchase_id).unwrap_or(&false) {
            return Err(SimError::AlreadyApplied);
        }
        if lines.is_empty() {
            // Rolls back before the flag commit, purchase stays receivable
            return Err(SimError::EmptyDocument);
        }
        self.applied.insert(purchase_id, true);
        for &(product, quantity) in lines {
            *self.stock.entry(product).or_insert(0) += quantity;
        }
        Ok(())
    }

    /// Cancel a purchase still on order. Received purchases keep their
    /// stock effect and cannot be cancelled.
    fn cancel_purchase(&mut self, purchase_id: u64) -> Result<(), SimError> {
        if *self.applied.get(&purchase_id).unwrap_or(&false) {
            return Err(SimError::AlreadyApplied);
        }
        self.cancelled.insert(purchase_id);
        Ok(())
    }

    /// Create an order: decrement every line or none, flag set with the
    /// same commit.
    fn create_order(&mut self, order_id: u64, lines: &[(ProductId, i32)]) -> Result<(), SimError> {
        if lines.is_empty() {
            return Err(SimError::EmptyDocument);
        }
        // All-or-nothing: check the whole document before mutating
        let mut needed: HashMap<ProductId, i32> = HashMap::new();
        for &(product, quantity) in lines {
            *needed.entry(product).or_insert(0) += quantity;
        }
        for (&product, &quantity) in &needed {
            if self.quantity(product) < quantity {
                return Err(SimError::NegativeStock);
            }
        }
        for (product, quantity) in needed {
            *self.stock.entry(product).or_insert(0) -= quantity;
        }
        self.applied.insert(order_id, true);
        Ok(())
    }

    /// Delivery-time catch-up for orders that never decremented stock
    fn complete_order(&mut self, order_id: u64, lines: &[(ProductId, i32)]) -> Result<(), SimError> {
        if *self.applied.get(&order_id).unwrap_or(&false) {
            // Already applied at creation: completion must not decrement again
            return Ok(());
        }
        for &(product, quantity) in lines {
            if self.quantity(product) < quantity {
                return Err(SimError::NegativeStock);
            }
        }
        for &(product, quantity) in lines {
            *self.stock.entry(product).or_insert(0) -= quantity;
        }
        self.applied.insert(order_id, true);
        Ok(())
    }
}

// ============================================================================
// Purchase receipt
// ============================================================================

#[test]
fn receiving_twice_applies_stock_once() {
    let mut sim = FulfillmentSim::new(80);
    let lines = [(1, 100), (2, 50)];

    sim.receive_purchase(7, &lines).unwrap();
    assert_eq!(sim.quantity(1), 100);
    assert_eq!(sim.quantity(2), 50);

    assert_eq!(sim.receive_purchase(7, &lines), Err(SimError::AlreadyApplied));
    assert_eq!(sim.quantity(1), 100);
    assert_eq!(sim.quantity(2), 50);
}

#[test]
fn empty_purchase_is_rejected_and_stays_receivable() {
    let mut sim = FulfillmentSim::new(80);
    assert_eq!(sim.receive_purchase(7, &[]), Err(SimError::EmptyDocument));
    // The failed receive did not burn the flag
    sim.receive_purchase(7, &[(1, 10)]).unwrap();
    assert_eq!(sim.quantity(1), 10);
}

#[test]
fn receipt_can_clear_low_status() {
    let mut sim = FulfillmentSim::new(80);
    sim.set_stock(1, 5);
    assert_eq!(sim.status(1), StockStatus::Low);
    sim.receive_purchase(7, &[(1, 100)]).unwrap();
    assert_eq!(sim.status(1), StockStatus::Ok);
}

#[test]
fn cancelled_purchase_cannot_be_received() {
    let mut sim = FulfillmentSim::new(80);
    sim.cancel_purchase(7).unwrap();

    assert_eq!(
        sim.receive_purchase(7, &[(1, 100)]),
        Err(SimError::CancelledDocument)
    );
    assert_eq!(sim.quantity(1), 0);

    // Retrying does not wear the guard down
    assert_eq!(
        sim.receive_purchase(7, &[(1, 100)]),
        Err(SimError::CancelledDocument)
    );
    assert_eq!(sim.quantity(1), 0);
}

#[test]
fn received_purchase_cannot_be_cancelled() {
    let mut sim = FulfillmentSim::new(80);
    sim.receive_purchase(7, &[(1, 100)]).unwrap();

    assert_eq!(sim.cancel_purchase(7), Err(SimError::AlreadyApplied));
    assert_eq!(sim.quantity(1), 100);
}

#[test]
fn purchase_status_round_trips() {
    for status in [
        PurchaseStatus::Ordered,
        PurchaseStatus::Received,
        PurchaseStatus::Cancelled,
    ] {
        assert_eq!(PurchaseStatus::parse(status.as_str()), Some(status));
    }
}

// ============================================================================
// Order creation and completion
// ============================================================================

#[test]
fn order_decrements_all_lines() {
    let mut sim = FulfillmentSim::new(80);
    sim.set_stock(1, 100);
    sim.set_stock(2, 100);

    sim.create_order(1, &[(1, 3), (2, 5)]).unwrap();
    assert_eq!(sim.quantity(1), 97);
    assert_eq!(sim.quantity(2), 95);
}

#[test]
fn short_line_rejects_entire_order() {
    let mut sim = FulfillmentSim::new(80);
    sim.set_stock(1, 100);
    sim.set_stock(2, 2);

    assert_eq!(
        sim.create_order(1, &[(1, 3), (2, 5)]),
        Err(SimError::NegativeStock)
    );
    // No partial decrement
    assert_eq!(sim.quantity(1), 100);
    assert_eq!(sim.quantity(2), 2);
}

#[test]
fn repeated_lines_for_same_product_are_summed() {
    let mut sim = FulfillmentSim::new(80);
    sim.set_stock(1, 5);
    // Two lines totalling 6 units against 5 on hand
    assert_eq!(
        sim.create_order(1, &[(1, 3), (1, 3)]),
        Err(SimError::NegativeStock)
    );
    assert_eq!(sim.quantity(1), 5);
}

#[test]
fn empty_order_is_rejected() {
    let mut sim = FulfillmentSim::new(80);
    assert_eq!(sim.create_order(1, &[]), Err(SimError::EmptyDocument));
}

#[test]
fn completion_after_creation_does_not_double_decrement() {
    let mut sim = FulfillmentSim::new(80);
    sim.set_stock(1, 100);
    let lines = [(1, 10)];

    sim.create_order(1, &lines).unwrap();
    assert_eq!(sim.quantity(1), 90);

    // Delivered later: already applied at creation
    sim.complete_order(1, &lines).unwrap();
    assert_eq!(sim.quantity(1), 90);
}

#[test]
fn legacy_order_decrements_at_completion() {
    let mut sim = FulfillmentSim::new(80);
    sim.set_stock(1, 100);
    // Order 9 predates decrement-at-creation: no flag set
    sim.complete_order(9, &[(1, 10)]).unwrap();
    assert_eq!(sim.quantity(1), 90);
    // A second delivery event is a no-op
    sim.complete_order(9, &[(1, 10)]).unwrap();
    assert_eq!(sim.quantity(1), 90);
}

#[test]
fn order_status_lifecycle() {
    assert!(OrderStatus::Delivered.is_completion());
    for status in [
        OrderStatus::New,
        OrderStatus::Processing,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::Cancelled,
        OrderStatus::Refund,
    ] {
        assert!(!status.is_completion());
    }
}

#[test]
fn delivered_order_does_not_re_enter_fulfillment() {
    assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Refund));
    assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::New));
    assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Processing));
}

#[test]
fn follow_up_is_created_once_per_order() {
    // Replay a hostile status stream through the transition guard and the
    // follow-up condition used at delivery.
    let mut status = OrderStatus::New;
    let mut follow_ups = 0;
    for next in [
        OrderStatus::Processing,
        OrderStatus::Delivered,
        OrderStatus::Processing,
        OrderStatus::Delivered,
        OrderStatus::Delivered,
    ] {
        if !status.can_transition_to(next) {
            continue;
        }
        if next.is_completion() && !status.is_completion() {
            follow_ups += 1;
        }
        status = next;
    }
    assert_eq!(follow_ups, 1);
    assert_eq!(status, OrderStatus::Delivered);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// However many times a purchase receive is retried, stock moves once.
    #[test]
    fn receive_is_idempotent(
        initial in 0i32..500,
        quantity in 1i32..500,
        retries in 1usize..10,
    ) {
        let mut sim = FulfillmentSim::new(80);
        sim.set_stock(1, initial);
        for attempt in 0..retries {
            let result = sim.receive_purchase(42, &[(1, quantity)]);
            if attempt == 0 {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result, Err(SimError::AlreadyApplied));
            }
        }
        prop_assert_eq!(sim.quantity(1), initial + quantity);
    }

    /// An order either decrements every line or leaves all stock untouched.
    #[test]
    fn order_is_all_or_nothing(
        stock_a in 0i32..50,
        stock_b in 0i32..50,
        want_a in 1i32..50,
        want_b in 1i32..50,
    ) {
        let mut sim = FulfillmentSim::new(80);
        sim.set_stock(1, stock_a);
        sim.set_stock(2, stock_b);

        let result = sim.create_order(1, &[(1, want_a), (2, want_b)]);
        if stock_a >= want_a && stock_b >= want_b {
            prop_assert!(result.is_ok());
            prop_assert_eq!(sim.quantity(1), stock_a - want_a);
            prop_assert_eq!(sim.quantity(2), stock_b - want_b);
        } else {
            prop_assert_eq!(result, Err(SimError::NegativeStock));
            prop_assert_eq!(sim.quantity(1), stock_a);
            prop_assert_eq!(sim.quantity(2), stock_b);
        }
    }

    /// Interleaved receives and orders never drive any product negative.
    #[test]
    fn mixed_workload_keeps_stock_non_negative(
        ops in prop::collection::vec((0u8..2, 1u32..4, 1i32..100), 0..40),
    ) {
        let mut sim = FulfillmentSim::new(80);
        for (i, (kind, product, quantity)) in ops.into_iter().enumerate() {
            let doc_id = i as u64;
            let lines = [(product, quantity)];
            match kind {
                0 => { let _ = sim.receive_purchase(doc_id, &lines); }
                _ => { let _ = sim.create_order(doc_id, &lines); }
            }
            prop_assert!(sim.quantity(product) >= 0);
        }
    }
}

// ============================================================================
// Purchase totals
// ============================================================================

#[test]
fn purchase_total_is_sum_of_line_costs() {
    let lines = [(dec("89.00"), 100), (dec("65.00"), 50)];
    let total: Decimal = lines
        .iter()
        .map(|(cost, quantity)| *cost * Decimal::from(*quantity))
        .sum();
    assert_eq!(total, dec("12150.00"));
}
