//! Purchase order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::PaymentStatus;

/// Purchase lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PurchaseStatus {
    #[default]
    Ordered,
    Received,
    Cancelled,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Ordered => "Ordered",
            PurchaseStatus::Received => "Received",
            PurchaseStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Ordered" => Some(PurchaseStatus::Ordered),
            "Received" => Some(PurchaseStatus::Received),
            "Cancelled" => Some(PurchaseStatus::Cancelled),
            _ => None,
        }
    }
}

/// Purchase header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub date: DateTime<Utc>,
    pub status: PurchaseStatus,
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    /// Idempotency guard: receipt increments stock exactly once
    pub stock_applied: bool,
    pub received_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// One line of a purchase, product name and cost snapshotted at creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub cost_price: Decimal,
}
