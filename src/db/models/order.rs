//! Order aggregate models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Initial status stamped by the orchestrator on create. The status set is
/// otherwise open; later values come from the caller on update.
pub const STATUS_CREATED: &str = "CREATED";

/// Order aggregate root
///
/// `total` is derived at create time from resolved product prices; it is
/// never the caller's self-reported figure on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Owning customer, stamped from the verified principal on create
    pub customer_id: String,
    pub status: String,
    pub total: Decimal,
    /// Set once on create, never mutated
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// Order line item
///
/// Owned exclusively by one order (`order_id` foreign key). `unit_price` is
/// captured from the product service at create time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// Write model for a new order (id assigned by the store)
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer_id: String,
    pub status: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemCreate>,
}

/// Write model for a new line item
#[derive(Debug, Clone)]
pub struct OrderItemCreate {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Decimal,
}

/// Write model for an order update
///
/// `items`, when present, is the complete replacement set: items carrying an
/// id are updated in place, items without one are inserted, and existing
/// items absent from the set are deleted (orphan removal).
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub status: String,
    pub total: Decimal,
    pub customer_id: Option<String>,
    pub items: Option<Vec<OrderItemWrite>>,
}

/// One replacement line item in an update
#[derive(Debug, Clone)]
pub struct OrderItemWrite {
    pub id: Option<i64>,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Decimal,
}
