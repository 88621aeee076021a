//! Order types
//!
//! - Snapshots: the server-side order as returned by every order endpoint
//! - Requests: bodies for create / append / checkout
//! - Pricing: the single pricing formula shared by cart and order views

pub mod pricing;
pub mod request;
pub mod types;

// Re-exports
pub use request::{OrderAddItemsRequest, OrderCheckoutRequest, OrderCreateRequest, OrderItemRequest};
pub use types::*;
