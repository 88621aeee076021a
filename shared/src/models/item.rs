//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu item ID
pub type ItemId = i64;

/// Item option ID
pub type OptionId = i64;

/// Menu item entity
///
/// Immutable reference data, fetched once per authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Price in the smallest currency unit
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i64,
    /// Options available for this item, in display order
    #[serde(default)]
    pub options: Vec<ItemOption>,
}

impl Item {
    /// Stock is only decremented at checkout, so this is advisory.
    pub fn is_sold_out(&self) -> bool {
        self.stock <= 0
    }

    pub fn option(&self, id: OptionId) -> Option<&ItemOption> {
        self.options.iter().find(|o| o.id == id)
    }
}

/// Item option (topping, size, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemOption {
    pub id: OptionId,
    pub name: String,
    /// Signed; negative values are discounts
    pub price_adjustment: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_deserializes_without_optional_fields() {
        let json = r#"{"id": 3, "name": "Gyoza", "price": 350}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 3);
        assert!(item.options.is_empty());
        assert!(item.category.is_none());
        assert!(item.is_sold_out());
    }

    #[test]
    fn test_item_option_lookup() {
        let json = r#"{
            "id": 1, "name": "Ramen", "price": 780, "category": "Noodles", "stock": 5,
            "options": [{"id": 101, "name": "Extra chashu", "price_adjustment": 100}]
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(!item.is_sold_out());
        assert_eq!(item.option(101).map(|o| o.price_adjustment), Some(100));
        assert!(item.option(102).is_none());
    }
}
