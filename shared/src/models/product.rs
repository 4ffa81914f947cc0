//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog product. The SKU is unique and must not change once the
/// product is referenced by historical order/purchase lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub cost: Decimal,
    pub price: Decimal,
    pub min_stock: i32,
    pub description: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub active: bool,
    /// UI accent color key (e.g. "omega", "d3")
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}
