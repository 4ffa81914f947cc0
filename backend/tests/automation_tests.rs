//! Low-stock task automation tests
//!
//! The automation keeps at most one open Stock task per product, enforced
//! by a partial unique index and an insert that does nothing on conflict.
//! The simulation here replays status changes against that dedup rule.

use std::collections::HashMap;

use proptest::prelude::*;

use shared::models::{StockStatus, TaskPriority, TaskStatus, STOCK_TASK_DUE_DAYS};

type ProductId = u32;

#[derive(Debug, Clone)]
struct SimTask {
    product_id: ProductId,
    priority: TaskPriority,
    status: TaskStatus,
}

/// Replays the automation against a task list with the partial unique
/// index's dedup semantics.
#[derive(Default)]
struct AutomationSim {
    tasks: Vec<SimTask>,
    alerts_sent: usize,
}

impl AutomationSim {
    fn open_task_for(&self, product_id: ProductId) -> Option<&SimTask> {
        self.tasks
            .iter()
            .find(|t| t.product_id == product_id && t.status.is_open())
    }

    /// Mirror of on_status_change: open a task for Low/Out, close for Ok.
    fn on_status_change(&mut self, product_id: ProductId, status: StockStatus) {
        if status.needs_replenishment() {
            // ON CONFLICT DO NOTHING against the open-task index
            if self.open_task_for(product_id).is_some() {
                return;
            }
            self.tasks.push(SimTask {
                product_id,
                priority: TaskPriority::for_stock_status(status),
                status: TaskStatus::Planned,
            });
            // Alert fires only when a task was actually inserted
            self.alerts_sent += 1;
        } else {
            for task in &mut self.tasks {
                if task.product_id == product_id && task.status.is_open() {
                    task.status = TaskStatus::Done;
                }
            }
        }
    }
}

#[test]
fn low_status_opens_one_task() {
    let mut sim = AutomationSim::default();
    sim.on_status_change(1, StockStatus::Low);
    assert_eq!(sim.tasks.len(), 1);
    assert_eq!(sim.tasks[0].priority, TaskPriority::Medium);
    assert_eq!(sim.alerts_sent, 1);
}

#[test]
fn repeated_low_events_do_not_stack_tasks() {
    let mut sim = AutomationSim::default();
    sim.on_status_change(1, StockStatus::Low);
    sim.on_status_change(1, StockStatus::Low);
    sim.on_status_change(1, StockStatus::Out);
    assert_eq!(sim.tasks.len(), 1);
    assert_eq!(sim.alerts_sent, 1);
}

#[test]
fn out_of_stock_opens_high_priority_task() {
    let mut sim = AutomationSim::default();
    sim.on_status_change(1, StockStatus::Out);
    assert_eq!(sim.tasks[0].priority, TaskPriority::High);
}

#[test]
fn recovery_closes_the_open_task() {
    let mut sim = AutomationSim::default();
    sim.on_status_change(1, StockStatus::Low);
    sim.on_status_change(1, StockStatus::Ok);
    assert!(sim.open_task_for(1).is_none());
    assert_eq!(sim.tasks[0].status, TaskStatus::Done);
}

#[test]
fn closed_task_allows_a_fresh_one() {
    let mut sim = AutomationSim::default();
    sim.on_status_change(1, StockStatus::Low);
    sim.on_status_change(1, StockStatus::Ok);
    sim.on_status_change(1, StockStatus::Out);
    assert_eq!(sim.tasks.len(), 2);
    assert_eq!(sim.alerts_sent, 2);
    let open = sim.open_task_for(1).unwrap();
    assert_eq!(open.priority, TaskPriority::High);
}

#[test]
fn products_are_tracked_independently() {
    let mut sim = AutomationSim::default();
    sim.on_status_change(1, StockStatus::Low);
    sim.on_status_change(2, StockStatus::Out);
    sim.on_status_change(1, StockStatus::Ok);
    assert!(sim.open_task_for(1).is_none());
    assert!(sim.open_task_for(2).is_some());
}

#[test]
fn ok_with_no_open_task_is_a_no_op() {
    let mut sim = AutomationSim::default();
    sim.on_status_change(1, StockStatus::Ok);
    assert!(sim.tasks.is_empty());
    assert_eq!(sim.alerts_sent, 0);
}

#[test]
fn stock_task_due_window_is_three_days() {
    assert_eq!(STOCK_TASK_DUE_DAYS, 3);
}

fn status_strategy() -> impl Strategy<Value = StockStatus> {
    prop_oneof![
        Just(StockStatus::Ok),
        Just(StockStatus::Low),
        Just(StockStatus::Out),
    ]
}

proptest! {
    /// Any event sequence leaves at most one open Stock task per product.
    #[test]
    fn at_most_one_open_task_per_product(
        events in prop::collection::vec((1u32..4, status_strategy()), 0..60),
    ) {
        let mut sim = AutomationSim::default();
        for (product_id, status) in events {
            sim.on_status_change(product_id, status);
            let mut open: HashMap<ProductId, usize> = HashMap::new();
            for task in sim.tasks.iter().filter(|t| t.status.is_open()) {
                *open.entry(task.product_id).or_insert(0) += 1;
            }
            for count in open.values() {
                prop_assert!(*count <= 1);
            }
        }
    }

    /// Every alert corresponds to a task insert, never a dedup hit.
    #[test]
    fn alerts_match_task_inserts(
        events in prop::collection::vec((1u32..4, status_strategy()), 0..60),
    ) {
        let mut sim = AutomationSim::default();
        for (product_id, status) in events {
            sim.on_status_change(product_id, status);
        }
        prop_assert_eq!(sim.alerts_sent, sim.tasks.len());
    }
}
