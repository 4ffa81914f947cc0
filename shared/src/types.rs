//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Payment status shared by orders, purchases and expenses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Unpaid",
            PaymentStatus::Partial => "Partial",
            PaymentStatus::Paid => "Paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Unpaid" => Some(PaymentStatus::Unpaid),
            "Partial" => Some(PaymentStatus::Partial),
            "Paid" => Some(PaymentStatus::Paid),
            _ => None,
        }
    }
}

/// Query limit for history/audit listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueryLimit(pub i64);

impl Default for QueryLimit {
    fn default() -> Self {
        Self(100)
    }
}
