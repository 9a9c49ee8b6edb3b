//! Order record - the persisted order with its items

use super::types::{ItemStatus, OrderItem, OrderStatus};
use crate::util::now_millis;
use serde::{Deserialize, Serialize};

/// A placed order with its per-seller items, persisted as one row.
///
/// `total_amount` is fixed at creation and always equals
/// Σ `price_at_purchase * quantity` over the items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: String,
    /// Placement time (Unix milliseconds)
    pub order_date: i64,
    /// Estimated delivery time (Unix milliseconds)
    pub estimated_delivery: i64,
    /// Immutable after creation
    pub total_amount: f64,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl OrderRecord {
    pub fn new(
        order_id: String,
        customer_id: String,
        items: Vec<OrderItem>,
        total_amount: f64,
        estimated_delivery: i64,
    ) -> Self {
        let now = now_millis();
        Self {
            order_id,
            customer_id,
            order_date: now,
            estimated_delivery,
            total_amount,
            status: OrderStatus::Pending,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Pending)
            .count()
    }

    pub fn approved_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Approved)
            .count()
    }

    pub fn rejected_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == ItemStatus::Rejected)
            .count()
    }

    pub fn item(&self, item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn item_mut(&mut self, item_id: &str) -> Option<&mut OrderItem> {
        self.items.iter_mut().find(|i| i.item_id == item_id)
    }

    /// Distinct sellers with at least one item in this order, in first-seen
    /// order. This is how one customer order fans out to seller queues.
    pub fn seller_ids(&self) -> Vec<String> {
        let mut sellers: Vec<String> = Vec::new();
        for item in &self.items {
            if !sellers.contains(&item.seller_id) {
                sellers.push(item.seller_id.clone());
            }
        }
        sellers
    }

    pub fn items_for_seller(&self, seller_id: &str) -> Vec<OrderItem> {
        self.items
            .iter()
            .filter(|i| i.seller_id == seller_id)
            .cloned()
            .collect()
    }

    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, seller: &str, status: ItemStatus) -> OrderItem {
        OrderItem {
            item_id: id.to_string(),
            product_id: format!("prod-{id}"),
            product_name: "Test".to_string(),
            seller_id: seller.to_string(),
            quantity: 1,
            price_at_purchase: 10.0,
            status,
            refund_issued: false,
            decided_at: None,
        }
    }

    #[test]
    fn counts_by_status() {
        let order = OrderRecord::new(
            "o1".to_string(),
            "c1".to_string(),
            vec![
                item("i1", "s1", ItemStatus::Pending),
                item("i2", "s1", ItemStatus::Approved),
                item("i3", "s2", ItemStatus::Rejected),
            ],
            30.0,
            0,
        );

        assert_eq!(order.pending_count(), 1);
        assert_eq!(order.approved_count(), 1);
        assert_eq!(order.rejected_count(), 1);
    }

    #[test]
    fn seller_ids_are_deduplicated_in_first_seen_order() {
        let order = OrderRecord::new(
            "o1".to_string(),
            "c1".to_string(),
            vec![
                item("i1", "s2", ItemStatus::Pending),
                item("i2", "s1", ItemStatus::Pending),
                item("i3", "s2", ItemStatus::Pending),
            ],
            30.0,
            0,
        );

        assert_eq!(order.seller_ids(), vec!["s2".to_string(), "s1".to_string()]);
        assert_eq!(order.items_for_seller("s2").len(), 2);
    }
}
