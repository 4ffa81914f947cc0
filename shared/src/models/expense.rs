//! Expense models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::PaymentStatus;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExpenseCategory {
    #[serde(rename = "COGS")]
    Cogs,
    Marketing,
    Shipping,
    Software,
    Operations,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Cogs => "COGS",
            ExpenseCategory::Marketing => "Marketing",
            ExpenseCategory::Shipping => "Shipping",
            ExpenseCategory::Software => "Software",
            ExpenseCategory::Operations => "Operations",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "COGS" => Some(ExpenseCategory::Cogs),
            "Marketing" => Some(ExpenseCategory::Marketing),
            "Shipping" => Some(ExpenseCategory::Shipping),
            "Software" => Some(ExpenseCategory::Software),
            "Operations" => Some(ExpenseCategory::Operations),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub category: ExpenseCategory,
    pub amount: Decimal,
    pub payment_status: PaymentStatus,
    pub supplier_id: Option<Uuid>,
    pub notes: Option<String>,
}
