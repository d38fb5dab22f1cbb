//! Order Model
//!
//! Orders move `pending -> completed` or `pending -> cancelled`; both end
//! states are terminal.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::dining_table::DiningTable;
use super::item::Item;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Table reserved, not paid yet
    #[default]
    Pending,
    /// Checked out
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Order row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Owner, set at creation and never changed
    pub user_id: i64,
    /// Held table; becomes `None` if the table is deleted
    pub table_id: Option<i64>,
    pub status: OrderStatus,
    /// Captured at checkout
    pub name: Option<String>,
    /// Captured at checkout
    pub phone_number: Option<String>,
    /// Milliseconds since epoch
    pub created_at: i64,
    pub updated_at: i64,
}

/// Line item row, unique per (order_id, item_id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub item_id: i64,
    pub quantity: i32,
}

/// Line item as presented in an order snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub item: Item,
    pub quantity: i32,
    /// `quantity × item.price`, exact
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

/// Full order snapshot, recomputed on every read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub user_id: i64,
    pub table: Option<DiningTable>,
    pub status: OrderStatus,
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub items: Vec<OrderLine>,
    /// Sum of line subtotals rounded to 2 decimal places
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
}

// ── Requests ──

/// One requested line of a new order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItemInput {
    pub item_id: Option<i64>,
    /// Defaults to 1 when omitted
    pub quantity: Option<i64>,
}

/// POST /api/orders/place_order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub table_id: Option<i64>,
    #[serde(default)]
    pub items: Vec<LineItemInput>,
}

/// POST /api/orders/{id}/add_item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddItemRequest {
    pub item_id: Option<i64>,
    /// Defaults to 1 when omitted
    pub quantity: Option<i64>,
}

/// POST /api/orders/{id}/checkout
///
/// Clients send the phone under either `phone` or `phone_number`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub phone_number: Option<String>,
}

// ── Responses ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemResponse {
    pub status: String,
    pub order_id: i64,
    pub order: OrderDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub order: OrderDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderAck {
    pub status: String,
    pub order_id: i64,
}
