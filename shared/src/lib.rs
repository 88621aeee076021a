//! Shared types for the kiosk
//!
//! Menu and order models exchanged with the ordering backend, the request
//! DTOs sent to it, and the pricing formula used on both sides of the wire.

pub mod client;
pub mod models;
pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{AgeGroup, Demographics, Gender, Item, ItemId, ItemOption, OptionId};
pub use order::{Order, OrderId, OrderItem, OrderStatus, PaymentMethod};
