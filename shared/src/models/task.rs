//! Task models
//!
//! Low-stock follow-up tasks are created and closed by the stock automation;
//! everything else is user-managed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::stock::StockStatus;

/// Due offset for automation-created stock tasks
pub const STOCK_TASK_DUE_DAYS: i64 = 3;

/// Due offset for the post-delivery customer follow-up task
pub const FOLLOW_UP_DUE_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TaskPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::High => "High",
            TaskPriority::Medium => "Medium",
            TaskPriority::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "High" => Some(TaskPriority::High),
            "Medium" => Some(TaskPriority::Medium),
            "Low" => Some(TaskPriority::Low),
            _ => None,
        }
    }

    /// Priority of the automation task for a depleted/low product
    pub fn for_stock_status(status: StockStatus) -> Self {
        match status {
            StockStatus::Out => TaskPriority::High,
            _ => TaskPriority::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Planned,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Planned => "Planned",
            TaskStatus::InProgress => "InProgress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Planned" => Some(TaskStatus::Planned),
            "InProgress" => Some(TaskStatus::InProgress),
            "Done" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, TaskStatus::Done)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TaskType {
    Customer,
    Order,
    Product,
    Stock,
    Supplier,
    #[default]
    Admin,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Customer => "Customer",
            TaskType::Order => "Order",
            TaskType::Product => "Product",
            TaskType::Stock => "Stock",
            TaskType::Supplier => "Supplier",
            TaskType::Admin => "Admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Customer" => Some(TaskType::Customer),
            "Order" => Some(TaskType::Order),
            "Product" => Some(TaskType::Product),
            "Stock" => Some(TaskType::Stock),
            "Supplier" => Some(TaskType::Supplier),
            "Admin" => Some(TaskType::Admin),
            _ => None,
        }
    }
}

/// A follow-up task, optionally linked to a CRM entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub customer_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_stock_tasks_are_high_priority() {
        assert_eq!(
            TaskPriority::for_stock_status(StockStatus::Out),
            TaskPriority::High
        );
        assert_eq!(
            TaskPriority::for_stock_status(StockStatus::Low),
            TaskPriority::Medium
        );
    }

    #[test]
    fn done_is_the_only_closed_status() {
        assert!(TaskStatus::Planned.is_open());
        assert!(TaskStatus::InProgress.is_open());
        assert!(!TaskStatus::Done.is_open());
    }
}
