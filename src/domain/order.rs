//! Orders, their lines and lifecycle status.
use super::{AddressId, FoodId, Money, PaymentMethod, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

string_id!(
    /// Identifier of a placed order.
    OrderId
);

string_id!(
    /// Identifier of one order line.
    OrderLineId
);

/// Lifecycle status of an order.
///
/// Forward chain: `Pending -> Confirmed -> Preparing -> Ready -> OutForDelivery -> Delivered`,
/// plus `Cancelled` from any non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::Ready,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::Ready => "ready",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Position on the forward chain. `None` for `Cancelled`, which sits off the chain.
    pub const fn rank(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Preparing => Some(2),
            Self::Ready => Some(3),
            Self::OutForDelivery => Some(4),
            Self::Delivered => Some(5),
            Self::Cancelled => None,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {}", s))
    }
}

/// Represents a placed order.
///
/// `total_amount` is the sum of the line totals at creation and is never recomputed.
/// `status` (and `updated_at`) are the only fields that change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub address_id: AddressId,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One priced line of an order. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub food_id: FoodId,
    pub quantity: u32,
    /// Price snapshot taken when the order was placed.
    pub unit_price: Money,
    pub total_price: Money,
}

/// One requested `(food, quantity)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub food_id: FoodId,
    pub quantity: u32,
}

impl OrderItemInput {
    pub fn new(food_id: impl Into<FoodId>, quantity: u32) -> Self {
        Self {
            food_id: food_id.into(),
            quantity,
        }
    }
}

/// Payload for placing a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    pub address_id: AddressId,
    pub items: Vec<OrderItemInput>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Falls back to the configured default method when absent.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl CreateOrderInput {
    pub fn new(address_id: impl Into<AddressId>, items: Vec<OrderItemInput>) -> Self {
        Self {
            address_id: address_id.into(),
            items,
            notes: None,
            payment_method: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }
}
