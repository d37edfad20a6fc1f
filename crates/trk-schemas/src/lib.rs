//! trk-schemas
//!
//! Wire types shared by the fetch client, the push listener and the view
//! state. JSON field names are camelCase to match the storefront backend.
//! Unknown fields are ignored so backend additions never break decoding.

pub mod money;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use money::Money;

/// Event name carried by push messages that deliver a fresh order snapshot.
pub const ORDER_UPDATE_EVENT: &str = "order_update";

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// Read-only replica of a backend order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: String,
    /// Human-readable payment/transaction reference.
    #[serde(default, alias = "txRef", alias = "transactionRef")]
    pub transaction_reference: Option<String>,
    /// Coarse status label. Opaque: no transition graph is enforced.
    pub status: String,
    /// Courier-side status that overrides `status` for display when set.
    #[serde(default)]
    pub delivery_status: Option<String>,
    #[serde(default)]
    pub rider_name: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
    pub total_amount: Money,
    #[serde(default)]
    pub delivery_fee: Money,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry>,
}

impl Order {
    /// Status to show the customer: `delivery_status` when present and
    /// non-blank, otherwise `status`.
    pub fn display_status(&self) -> &str {
        match self.delivery_status.as_deref() {
            Some(s) if !s.trim().is_empty() => s,
            _ => &self.status,
        }
    }

    /// Check the shape invariants serde cannot express.
    pub fn validate(&self) -> Result<(), OrderInvalid> {
        if self.order_id.trim().is_empty() {
            return Err(OrderInvalid::MissingOrderId);
        }
        for (index, item) in self.items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(OrderInvalid::ZeroQuantity { index });
            }
            if !item.price.is_non_negative() {
                return Err(OrderInvalid::NegativeAmount {
                    field: "items.price",
                });
            }
        }
        if !self.total_amount.is_non_negative() {
            return Err(OrderInvalid::NegativeAmount {
                field: "totalAmount",
            });
        }
        if !self.delivery_fee.is_non_negative() {
            return Err(OrderInvalid::NegativeAmount {
                field: "deliveryFee",
            });
        }
        Ok(())
    }

    /// Sum of line totals. `None` on overflow.
    pub fn items_subtotal(&self) -> Option<Money> {
        self.items
            .iter()
            .try_fold(Money::ZERO, |acc, item| acc.checked_add(item.line_total()?))
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub product_name: String,
    pub quantity: u32,
    /// Unit price.
    pub price: Money,
}

impl Item {
    /// `quantity * price`, or `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.price.checked_mul_qty(self.quantity)
    }
}

/// One status transition. Position in the history is the only ordering
/// signal; there is no sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

/// Why a decoded order was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderInvalid {
    MissingOrderId,
    ZeroQuantity { index: usize },
    NegativeAmount { field: &'static str },
}

impl fmt::Display for OrderInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderInvalid::MissingOrderId => write!(f, "order has no orderId"),
            OrderInvalid::ZeroQuantity { index } => {
                write!(f, "item {index} has quantity 0")
            }
            OrderInvalid::NegativeAmount { field } => write!(f, "{field} is negative"),
        }
    }
}

impl std::error::Error for OrderInvalid {}

// ---------------------------------------------------------------------------
// Push envelope
// ---------------------------------------------------------------------------

/// Outer shape of every push frame: `{ event, data }`.
///
/// `data` stays untyped here because its shape depends on `event`; only
/// `order_update` payloads are decoded further (see [`OrderUpdateData`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEnvelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// `data` payload of an `order_update` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderUpdateData {
    pub order: Order,
}

impl PushEnvelope {
    /// Build an `order_update` envelope. Used by test backends and tools.
    pub fn order_update(order: &Order) -> serde_json::Result<Self> {
        Ok(Self {
            event: ORDER_UPDATE_EVENT.to_string(),
            data: serde_json::to_value(OrderUpdateData {
                order: order.clone(),
            })?,
        })
    }
}

/// Error body returned by the tracking endpoint on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
