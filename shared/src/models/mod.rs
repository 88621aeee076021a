//! Data models
//!
//! Menu reference data and the customer attributes captured before ordering.
//! All IDs are `i64` (INTEGER PRIMARY KEY on the backend).

pub mod demographic;
pub mod item;

// Re-exports
pub use demographic::*;
pub use item::*;
