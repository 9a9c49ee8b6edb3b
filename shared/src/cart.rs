//! Shopping cart types

use crate::util::now_millis;
use serde::{Deserialize, Serialize};

/// One product line in a cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i32,
}

/// A customer's pre-purchase holding area.
///
/// The cart entity persists across purchases; order placement only removes
/// the purchased lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    pub customer_id: String,
    pub items: Vec<CartItem>,
    pub updated_at: i64,
}

impl Cart {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: customer_id.into(),
            items: Vec::new(),
            updated_at: now_millis(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add quantity for a product, merging with an existing line
    pub fn add_item(&mut self, product_id: &str, quantity: i32) {
        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(line) => line.quantity += quantity,
            None => self.items.push(CartItem {
                product_id: product_id.to_string(),
                quantity,
            }),
        }
        self.updated_at = now_millis();
    }

    /// Remove a product line entirely. Returns true if a line was removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        let removed = self.items.len() != before;
        if removed {
            self.updated_at = now_millis();
        }
        removed
    }

    /// Remove the given product lines (called after they were purchased)
    pub fn remove_purchased(&mut self, product_ids: &[String]) {
        self.items.retain(|i| !product_ids.contains(&i.product_id));
        self.updated_at = now_millis();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_item_merges_quantity() {
        let mut cart = Cart::new("cust-1");
        cart.add_item("p1", 2);
        cart.add_item("p1", 3);
        cart.add_item("p2", 1);

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn remove_purchased_keeps_other_lines() {
        let mut cart = Cart::new("cust-1");
        cart.add_item("p1", 1);
        cart.add_item("p2", 1);
        cart.add_item("p3", 1);

        cart.remove_purchased(&["p1".to_string(), "p3".to_string()]);

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].product_id, "p2");
    }
}
