//! Request bodies for the order endpoints

use serde::{Deserialize, Serialize};

use super::PaymentMethod;
use crate::models::{AgeGroup, Gender, ItemId, OptionId};

/// One cart line as submitted to the kitchen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderItemRequest {
    pub item_id: ItemId,
    pub quantity: u32,
    #[serde(default)]
    pub option_ids: Vec<OptionId>,
}

/// `POST /orders`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderCreateRequest {
    pub items: Vec<OrderItemRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_group: Option<AgeGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

/// `POST /orders/{id}/items`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderAddItemsRequest {
    pub items: Vec<OrderItemRequest>,
}

/// `POST /orders/{id}/checkout`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderCheckoutRequest {
    pub payment_method: PaymentMethod,
}
