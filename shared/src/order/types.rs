//! Order snapshot types
//!
//! The backend always returns the whole order; the client replaces its copy
//! wholesale and never patches it field by field.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::pricing;
use crate::models::{AgeGroup, Gender, Item, ItemOption};

// ============================================================================
// Identifiers
// ============================================================================

/// Server-assigned order ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub i64);

impl OrderId {
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OrderId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ============================================================================
// Status / Payment
// ============================================================================

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Submitted, not yet paid / served
    #[default]
    Pending,
    /// Paid (and handed over by the kitchen)
    Completed,
    /// Any status set from the admin side that the kiosk does not model
    #[serde(other)]
    Unknown,
}

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    CreditCard,
    EMoney,
    QrCode,
}

impl PaymentMethod {
    /// Every method offered on the selection step, in display order
    pub const ALL: [PaymentMethod; 4] = [Self::Cash, Self::CreditCard, Self::EMoney, Self::QrCode];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::CreditCard => "credit_card",
            Self::EMoney => "e_money",
            Self::QrCode => "qr_code",
        }
    }

    /// Label shown on the selection step
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::CreditCard => "Credit card",
            Self::EMoney => "E-money",
            Self::QrCode => "QR code",
        }
    }

    /// Instruction for the simulated physical step
    pub fn action_prompt(&self) -> &'static str {
        match self {
            Self::Cash => "Please insert cash into the change machine",
            Self::CreditCard => "Please insert your card into the terminal",
            Self::EMoney => "Please hold your phone or card over the reader",
            Self::QrCode => "Please scan the QR code with your phone",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownPaymentMethod(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

// ============================================================================
// Snapshot
// ============================================================================

/// Server-confirmed order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItem {
    pub id: i64,
    /// Item snapshot at submission time
    pub item: Item,
    pub quantity: u32,
    /// Resolved options
    #[serde(default)]
    pub options: Vec<ItemOption>,
}

impl OrderItem {
    pub fn line_total(&self) -> i64 {
        pricing::line_total(self.item.price, &self.options, self.quantity)
    }
}

/// Order snapshot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Total across all items, always derived from the snapshot
    pub fn total(&self) -> i64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    pub fn is_paid(&self) -> bool {
        self.payment_method.is_some()
    }

    /// Total number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "id": 123,
        "created_at": "2026-10-18T12:30:05.123456",
        "status": "pending",
        "payment_method": null,
        "age_group": "30s",
        "gender": "female",
        "items": [
            {
                "id": 1,
                "order_id": 123,
                "item_id": 7,
                "quantity": 2,
                "item": {"id": 7, "name": "Ramen", "price": 780, "stock": 10, "options": []},
                "options": [{"id": 101, "name": "Extra egg", "price_adjustment": 100}]
            },
            {
                "id": 2,
                "order_id": 123,
                "item_id": 9,
                "quantity": 1,
                "item": {"id": 9, "name": "Gyoza", "price": 350, "stock": 4, "options": []},
                "options": []
            }
        ]
    }"#;

    #[test]
    fn test_order_snapshot_deserialize() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(order.id, OrderId(123));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.is_paid());
        assert_eq!(order.age_group, Some(AgeGroup::Thirties));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.item_count(), 3);
    }

    #[test]
    fn test_order_total_uses_pricing_formula() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        // (780 + 100) * 2 + 350
        assert_eq!(order.total(), 2110);
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let json = ORDER_JSON.replace("\"pending\"", "\"cooking\"");
        let order: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown);
        assert!(!order.is_completed());
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("e_money".parse::<PaymentMethod>(), Ok(PaymentMethod::EMoney));
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
    }
}
