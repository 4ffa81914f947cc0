//! Stock ledger models
//!
//! The stock record is the authoritative per-product quantity/status store.
//! Every mutation goes through the ledger's apply-delta primitive and leaves
//! exactly one movement row behind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default minimum stock threshold for new products
pub const DEFAULT_MIN_STOCK: i32 = 80;

/// Derived stock status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StockStatus {
    #[serde(rename = "OK")]
    Ok,
    Low,
    Out,
}

impl StockStatus {
    /// Derive the status from quantity and threshold.
    ///
    /// Quantity equal to the threshold is OK; the Low band is a strict
    /// less-than.
    pub fn derive(quantity: i32, min_stock: i32) -> Self {
        if quantity == 0 {
            StockStatus::Out
        } else if quantity < min_stock {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::Ok => "OK",
            StockStatus::Low => "Low",
            StockStatus::Out => "Out",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OK" => Some(StockStatus::Ok),
            "Low" => Some(StockStatus::Low),
            "Out" => Some(StockStatus::Out),
            _ => None,
        }
    }

    pub fn needs_replenishment(&self) -> bool {
        matches!(self, StockStatus::Low | StockStatus::Out)
    }
}

/// One stock record per product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub min_stock: i32,
    pub status: StockStatus,
    pub last_updated: DateTime<Utc>,
}

/// What caused a stock movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementSource {
    Purchase,
    Order,
    Manual,
}

impl MovementSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementSource::Purchase => "PURCHASE",
            MovementSource::Order => "ORDER",
            MovementSource::Manual => "MANUAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PURCHASE" => Some(MovementSource::Purchase),
            "ORDER" => Some(MovementSource::Order),
            "MANUAL" => Some(MovementSource::Manual),
            _ => None,
        }
    }
}

/// Immutable audit row recording one quantity change and its cause.
/// Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub delta: i32,
    pub source: MovementSource,
    pub source_id: Option<Uuid>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Manual correction record, always paired with a MANUAL movement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: Uuid,
    pub product_id: Uuid,
    pub delta: i32,
    pub reason: Option<String>,
    pub adjusted_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_is_out() {
        assert_eq!(StockStatus::derive(0, 80), StockStatus::Out);
        assert_eq!(StockStatus::derive(0, 0), StockStatus::Out);
    }

    #[test]
    fn below_threshold_is_low() {
        assert_eq!(StockStatus::derive(1, 80), StockStatus::Low);
        assert_eq!(StockStatus::derive(79, 80), StockStatus::Low);
    }

    #[test]
    fn at_threshold_is_ok() {
        // Strict less-than for the Low band
        assert_eq!(StockStatus::derive(80, 80), StockStatus::Ok);
        assert_eq!(StockStatus::derive(5, 5), StockStatus::Ok);
    }

    #[test]
    fn above_threshold_is_ok() {
        assert_eq!(StockStatus::derive(200, 80), StockStatus::Ok);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [StockStatus::Ok, StockStatus::Low, StockStatus::Out] {
            assert_eq!(StockStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(StockStatus::parse("Unknown"), None);
    }
}
