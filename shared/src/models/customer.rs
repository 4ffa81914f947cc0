//! Customer models and activity tier derivation

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Orders needed for the VIP tier
pub const VIP_ORDER_COUNT: i64 = 10;

/// Days without an order before an Active customer is considered Inactive
pub const INACTIVE_AFTER_DAYS: i64 = 90;

/// Customer activity tier. Active/VIP/Inactive/New are recomputed by the
/// statistics aggregator; Lead and Lost are assigned manually only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CustomerStatus {
    Lead,
    #[default]
    New,
    Active,
    #[serde(rename = "VIP")]
    Vip,
    Inactive,
    Lost,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Lead => "Lead",
            CustomerStatus::New => "New",
            CustomerStatus::Active => "Active",
            CustomerStatus::Vip => "VIP",
            CustomerStatus::Inactive => "Inactive",
            CustomerStatus::Lost => "Lost",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Lead" => Some(CustomerStatus::Lead),
            "New" => Some(CustomerStatus::New),
            "Active" => Some(CustomerStatus::Active),
            "VIP" => Some(CustomerStatus::Vip),
            "Inactive" => Some(CustomerStatus::Inactive),
            "Lost" => Some(CustomerStatus::Lost),
            _ => None,
        }
    }

    /// Derive the activity tier from qualifying order history.
    ///
    /// Ten or more orders is VIP regardless of recency. Fewer orders keep the
    /// customer Active while the last order is within the 90-day window,
    /// Inactive after it. No orders at all means New.
    pub fn derive(
        order_count: i64,
        last_order_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        if order_count >= VIP_ORDER_COUNT {
            CustomerStatus::Vip
        } else if order_count > 0 {
            match last_order_date {
                Some(last) if (now - last).num_days() > INACTIVE_AFTER_DAYS => {
                    CustomerStatus::Inactive
                }
                _ => CustomerStatus::Active,
            }
        } else {
            CustomerStatus::New
        }
    }
}

/// Customer type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum CustomerType {
    #[default]
    Private,
    Business,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Private => "Private",
            CustomerType::Business => "Business",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Private" => Some(CustomerType::Private),
            "Business" => Some(CustomerType::Business),
            _ => None,
        }
    }
}

/// A customer. The statistics fields are derived by the aggregator and
/// always overwritten as a whole, never patched individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    #[serde(rename = "type")]
    pub customer_type: CustomerType,
    pub status: CustomerStatus,
    pub total_value: Decimal,
    pub order_count: i64,
    pub favorite_product: Option<String>,
    pub last_order_date: Option<DateTime<Utc>>,
    pub tags: Option<String>,
    pub notes: Option<String>,
    pub next_step: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Kind of customer timeline entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimelineKind {
    Order,
    Task,
    Note,
}

impl TimelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimelineKind::Order => "Order",
            TimelineKind::Task => "Task",
            TimelineKind::Note => "Note",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Order" => Some(TimelineKind::Order),
            "Task" => Some(TimelineKind::Task),
            "Note" => Some(TimelineKind::Note),
            _ => None,
        }
    }
}

/// An entry in a customer's activity timeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub date: DateTime<Utc>,
    pub kind: TimelineKind,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn no_orders_is_new() {
        let now = Utc::now();
        assert_eq!(CustomerStatus::derive(0, None, now), CustomerStatus::New);
    }

    #[test]
    fn recent_orders_are_active() {
        let now = Utc::now();
        let last = Some(now - Duration::days(10));
        assert_eq!(CustomerStatus::derive(3, last, now), CustomerStatus::Active);
    }

    #[test]
    fn stale_orders_are_inactive() {
        let now = Utc::now();
        let last = Some(now - Duration::days(91));
        assert_eq!(
            CustomerStatus::derive(3, last, now),
            CustomerStatus::Inactive
        );
    }

    #[test]
    fn ninety_days_exactly_is_still_active() {
        let now = Utc::now();
        let last = Some(now - Duration::days(90));
        assert_eq!(CustomerStatus::derive(1, last, now), CustomerStatus::Active);
    }

    #[test]
    fn ten_orders_is_vip_even_when_stale() {
        let now = Utc::now();
        let last = Some(now - Duration::days(365));
        assert_eq!(CustomerStatus::derive(10, last, now), CustomerStatus::Vip);
        assert_eq!(CustomerStatus::derive(25, None, now), CustomerStatus::Vip);
    }
}
