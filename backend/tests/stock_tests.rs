//! Stock ledger tests
//!
//! Logic-level tests for the ledger invariants: status derivation, the zero
//! floor on decrements, and movement-log completeness. The database applies
//! deltas with a single conditional UPDATE; the simulation here mirrors that
//! semantics so the invariants can be property-tested without a database.

use proptest::prelude::*;

use shared::models::{MovementSource, StockStatus, DEFAULT_MIN_STOCK};

// ============================================================================
// Ledger simulation
// ============================================================================

/// In-memory mirror of one stock record plus its movement log
struct LedgerSim {
    quantity: i32,
    min_stock: i32,
    status: StockStatus,
    movements: Vec<i32>,
}

impl LedgerSim {
    fn new(min_stock: i32) -> Self {
        Self {
            quantity: 0,
            min_stock,
            status: StockStatus::derive(0, min_stock),
            movements: Vec::new(),
        }
    }

    /// Apply a signed delta the way the conditional UPDATE does: reject any
    /// delta that would go below zero, otherwise mutate quantity and status
    /// together and append exactly one movement.
    fn apply_delta(&mut self, delta: i32) -> Result<(), ()> {
        let new_quantity = self.quantity + delta;
        if new_quantity < 0 {
            return Err(());
        }
        self.quantity = new_quantity;
        self.status = StockStatus::derive(new_quantity, self.min_stock);
        self.movements.push(delta);
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn status_is_out_at_zero() {
    assert_eq!(StockStatus::derive(0, 80), StockStatus::Out);
}

#[test]
fn status_is_low_below_threshold() {
    assert_eq!(StockStatus::derive(1, 80), StockStatus::Low);
    assert_eq!(StockStatus::derive(79, 80), StockStatus::Low);
}

#[test]
fn status_at_threshold_is_ok() {
    // quantity == min_stock is not low
    assert_eq!(StockStatus::derive(80, 80), StockStatus::Ok);
    assert_eq!(StockStatus::derive(81, 80), StockStatus::Ok);
}

#[test]
fn zero_threshold_never_reports_low() {
    assert_eq!(StockStatus::derive(0, 0), StockStatus::Out);
    assert_eq!(StockStatus::derive(1, 0), StockStatus::Ok);
}

#[test]
fn default_threshold_is_eighty() {
    assert_eq!(DEFAULT_MIN_STOCK, 80);
}

#[test]
fn decrement_below_zero_is_rejected_not_clamped() {
    let mut sim = LedgerSim::new(80);
    sim.apply_delta(10).unwrap();
    assert!(sim.apply_delta(-11).is_err());
    // The failed attempt must leave no trace
    assert_eq!(sim.quantity, 10);
    assert_eq!(sim.movements, vec![10]);
}

#[test]
fn decrement_to_exactly_zero_is_allowed() {
    let mut sim = LedgerSim::new(80);
    sim.apply_delta(5).unwrap();
    sim.apply_delta(-5).unwrap();
    assert_eq!(sim.quantity, 0);
    assert_eq!(sim.status, StockStatus::Out);
}

#[test]
fn replenishment_walks_status_back_up() {
    let mut sim = LedgerSim::new(80);
    assert_eq!(sim.status, StockStatus::Out);
    sim.apply_delta(40).unwrap();
    assert_eq!(sim.status, StockStatus::Low);
    sim.apply_delta(60).unwrap();
    assert_eq!(sim.status, StockStatus::Ok);
}

#[test]
fn needs_replenishment_for_low_and_out_only() {
    assert!(StockStatus::Out.needs_replenishment());
    assert!(StockStatus::Low.needs_replenishment());
    assert!(!StockStatus::Ok.needs_replenishment());
}

#[test]
fn movement_source_round_trips() {
    for source in [
        MovementSource::Purchase,
        MovementSource::Order,
        MovementSource::Manual,
    ] {
        assert_eq!(MovementSource::parse(source.as_str()), Some(source));
    }
    assert_eq!(MovementSource::parse("bogus"), None);
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// Quantity never goes negative no matter what deltas arrive.
    #[test]
    fn quantity_never_negative(deltas in prop::collection::vec(-200i32..200, 0..64)) {
        let mut sim = LedgerSim::new(80);
        for delta in deltas {
            let _ = sim.apply_delta(delta);
            prop_assert!(sim.quantity >= 0);
        }
    }

    /// Status always agrees with quantity and threshold after any sequence
    /// of mutations: the two can never be observed out of sync.
    #[test]
    fn status_always_consistent(
        min_stock in 0i32..500,
        deltas in prop::collection::vec(-200i32..200, 0..64),
    ) {
        let mut sim = LedgerSim::new(min_stock);
        for delta in deltas {
            let _ = sim.apply_delta(delta);
            prop_assert_eq!(sim.status, StockStatus::derive(sim.quantity, sim.min_stock));
        }
    }

    /// The movement log fully explains the quantity: summing all applied
    /// deltas reproduces the on-hand count.
    #[test]
    fn movements_sum_to_quantity(deltas in prop::collection::vec(-200i32..200, 0..64)) {
        let mut sim = LedgerSim::new(80);
        for delta in deltas {
            let _ = sim.apply_delta(delta);
        }
        let total: i32 = sim.movements.iter().sum();
        prop_assert_eq!(total, sim.quantity);
    }

    /// Exactly one movement per successful mutation, none for rejections.
    #[test]
    fn one_movement_per_successful_mutation(deltas in prop::collection::vec(-200i32..200, 0..64)) {
        let mut sim = LedgerSim::new(80);
        let mut applied = 0usize;
        for delta in deltas {
            if sim.apply_delta(delta).is_ok() {
                applied += 1;
            }
        }
        prop_assert_eq!(sim.movements.len(), applied);
    }

    /// Status derivation partitions the quantity range with no gaps.
    #[test]
    fn derive_covers_all_quantities(quantity in 0i32..10_000, min_stock in 0i32..10_000) {
        let status = StockStatus::derive(quantity, min_stock);
        match status {
            StockStatus::Out => prop_assert_eq!(quantity, 0),
            StockStatus::Low => {
                prop_assert!(quantity > 0);
                prop_assert!(quantity < min_stock);
            }
            StockStatus::Ok => {
                prop_assert!(quantity > 0);
                prop_assert!(quantity >= min_stock);
            }
        }
    }
}
