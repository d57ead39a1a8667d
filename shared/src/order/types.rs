//! Order model and request/response types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::OrderStatus;
use crate::money;
use crate::payment::PaymentConfirmation;

// ============================================================================
// Payment Method
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Paid through the hosted checkout; requires a verified confirmation
    #[default]
    Online,
    /// Paid at the counter on pickup
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Cash => "cash",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "online" => Some(Self::Online),
            "cash" => Some(Self::Cash),
            _ => None,
        }
    }
}

// ============================================================================
// Lines
// ============================================================================

/// One ordered food item, priced at order time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub food_id: String,
    #[serde(default)]
    pub name: String,
    pub quantity: i32,
    /// Unit price in major units at the time the order was placed
    pub unit_price: Decimal,
}

impl OrderLine {
    /// unit price × quantity (negative quantities count as zero)
    pub fn line_total(&self) -> Decimal {
        money::line_total(self.unit_price, u32::try_from(self.quantity).unwrap_or(0))
    }
}

/// Σ unit price × quantity over all lines
pub fn lines_subtotal(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(OrderLine::line_total).sum()
}

// ============================================================================
// Order
// ============================================================================

/// Persisted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Internal record id
    pub id: i64,
    /// Human-facing, strictly increasing number
    pub order_number: i64,
    pub user_id: String,
    pub customer_name: String,
    pub restaurant_id: String,
    pub restaurant_name: String,
    pub restaurant_location: String,
    pub lines: Vec<OrderLine>,
    pub subtotal: Decimal,
    pub total_amount: Decimal,
    pub delivery_fee: Decimal,
    pub tax: Decimal,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    /// 6-digit pickup code
    pub otp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Unix millis
    pub created_at: i64,
    /// Unix millis, refreshed on every mutation
    pub updated_at: i64,
}

// ============================================================================
// Requests / Responses
// ============================================================================

/// POST /orders
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub restaurant_id: String,
    pub lines: Vec<OrderLine>,
    pub total_amount: Decimal,
    pub delivery_fee: Decimal,
    pub tax: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Required for online payments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentConfirmation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// PUT /orders/:id/status
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// GET /orders/count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCountResponse {
    pub count: i64,
}
