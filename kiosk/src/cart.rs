//! Pending cart
//!
//! Lines the customer has picked but not yet sent to the kitchen. Never talks
//! to the network; the session manager clears it after a successful
//! submission.

use std::collections::BTreeSet;

use shared::order::pricing;
use shared::order::OrderItemRequest;
use shared::{Item, ItemOption, OptionId};

/// One distinct (item, option set) grouping with an aggregated quantity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item: Item,
    pub quantity: u32,
    pub selected_options: Vec<ItemOption>,
}

impl CartLine {
    fn option_ids(&self) -> BTreeSet<OptionId> {
        self.selected_options.iter().map(|o| o.id).collect()
    }

    /// Same item and the same option ids, compared as sets
    pub fn is_same_line(&self, item: &Item, options: &[ItemOption]) -> bool {
        self.item.id == item.id
            && self.option_ids() == options.iter().map(|o| o.id).collect::<BTreeSet<_>>()
    }

    pub fn unit_price(&self) -> i64 {
        pricing::unit_price(self.item.price, &self.selected_options)
    }

    pub fn line_total(&self) -> i64 {
        pricing::line_total(self.item.price, &self.selected_options, self.quantity)
    }

    /// Request record `{item_id, quantity, option_ids}`
    pub fn to_request(&self) -> OrderItemRequest {
        OrderItemRequest {
            item_id: self.item.id,
            quantity: self.quantity,
            option_ids: self.option_ids().into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CartModel {
    lines: Vec<CartLine>,
}

impl CartModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit, merging into an existing line when the item and option set match.
    ///
    /// Repeated option ids in `selected_options` collapse to one.
    pub fn add_line(&mut self, item: &Item, mut selected_options: Vec<ItemOption>) -> &CartLine {
        let mut seen = BTreeSet::new();
        selected_options.retain(|o| seen.insert(o.id));

        let index = match self
            .lines
            .iter()
            .position(|line| line.is_same_line(item, &selected_options))
        {
            Some(index) => {
                self.lines[index].quantity += 1;
                tracing::debug!(
                    item_id = item.id,
                    quantity = self.lines[index].quantity,
                    "Cart line merged"
                );
                index
            }
            None => {
                self.lines.push(CartLine {
                    item: item.clone(),
                    quantity: 1,
                    selected_options,
                });
                tracing::debug!(item_id = item.id, "Cart line added");
                self.lines.len() - 1
            }
        };
        &self.lines[index]
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Σ `(item.price + Σ option.price_adjustment) * quantity`
    pub fn total(&self) -> i64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramen() -> Item {
        Item {
            id: 1,
            name: "Ramen".into(),
            price: 780,
            image_url: None,
            category: Some("Noodles".into()),
            stock: 10,
            options: vec![opt(101, 100), opt(102, 50)],
        }
    }

    fn opt(id: OptionId, adj: i64) -> ItemOption {
        ItemOption {
            id,
            name: format!("opt-{}", id),
            price_adjustment: adj,
        }
    }

    #[test]
    fn test_single_line_with_option() {
        let mut cart = CartModel::new();
        cart.add_line(&ramen(), vec![opt(101, 100)]);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total(), 880);
    }

    #[test]
    fn test_same_item_without_options_merges() {
        let mut cart = CartModel::new();
        cart.add_line(&ramen(), vec![]);
        let line = cart.add_line(&ramen(), vec![]);
        assert_eq!(line.quantity, 2);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.total(), 1560);
    }

    #[test]
    fn test_option_order_does_not_matter() {
        let mut cart = CartModel::new();
        cart.add_line(&ramen(), vec![opt(101, 100), opt(102, 50)]);
        cart.add_line(&ramen(), vec![opt(102, 50), opt(101, 100)]);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_different_option_sets_are_separate_lines() {
        let mut cart = CartModel::new();
        cart.add_line(&ramen(), vec![]);
        cart.add_line(&ramen(), vec![opt(101, 100)]);
        cart.add_line(&ramen(), vec![opt(101, 100), opt(102, 50)]);
        assert_eq!(cart.lines().len(), 3);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), 780 + 880 + 930);
    }

    #[test]
    fn test_repeated_calls_accumulate_on_one_line() {
        let mut cart = CartModel::new();
        for _ in 0..7 {
            cart.add_line(&ramen(), vec![opt(102, 50)]);
        }
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 7);
    }

    #[test]
    fn test_duplicate_option_ids_collapse() {
        let mut cart = CartModel::new();
        let line = cart.add_line(&ramen(), vec![opt(101, 100), opt(101, 100)]);
        assert_eq!(line.selected_options.len(), 1);
        assert_eq!(line.unit_price(), 880);
        cart.add_line(&ramen(), vec![opt(101, 100)]);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_request_mapping_sorts_option_ids() {
        let mut cart = CartModel::new();
        cart.add_line(&ramen(), vec![opt(102, 50), opt(101, 100)]);
        let req = cart.lines()[0].to_request();
        assert_eq!(req.item_id, 1);
        assert_eq!(req.quantity, 1);
        assert_eq!(req.option_ids, vec![101, 102]);
    }

    #[test]
    fn test_clear() {
        let mut cart = CartModel::new();
        cart.add_line(&ramen(), vec![]);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }
}
