//! RejectItem action
//!
//! A seller declines to fulfill one of their order lines. The reserved
//! stock goes back to saleable inventory immediately; the wallet refund is
//! deliberately NOT issued here — it is issued by finalization once the
//! whole order is resolved, so the customer gets one summary of the order's
//! outcome instead of a drip of per-item emails.

use async_trait::async_trait;

use crate::actions::{ActionContext, ActionHandler, ActionOutcome};
use crate::catalog;
use crate::engine::error::{EngineError, EngineResult};
use crate::finalize;
use shared::order::ItemStatus;
use shared::util::now_millis;

/// RejectItem action
#[derive(Debug, Clone)]
pub struct RejectItemAction {
    pub item_id: String,
    pub acting_seller_id: String,
}

#[async_trait]
impl ActionHandler for RejectItemAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> EngineResult<ActionOutcome> {
        let mut order = ctx.load_order_for_item(&self.item_id)?;
        let item = order
            .item_mut(&self.item_id)
            .ok_or_else(|| EngineError::ItemNotFound(self.item_id.clone()))?;

        if item.seller_id != self.acting_seller_id {
            return Err(EngineError::NotItemOwner(self.item_id.clone()));
        }

        if item.status != ItemStatus::Pending {
            return Err(EngineError::AlreadyProcessed(self.item_id.clone()));
        }

        item.status = ItemStatus::Rejected;
        item.decided_at = Some(now_millis());

        // Release the reservation back to inventory
        let product_id = item.product_id.clone();
        let quantity = item.quantity;
        catalog::restore_stock(ctx.storage, ctx.txn, &product_id, quantity)?;

        let mut notifications = Vec::new();
        if let Some(notification) = finalize::finalize_if_complete(ctx.storage, ctx.txn, &mut order)?
        {
            notifications.push(notification);
        }
        ctx.save_order(&mut order)?;

        tracing::info!(
            item_id = %self.item_id,
            order_id = %order.order_id,
            seller_id = %self.acting_seller_id,
            product_id = %product_id,
            restored = quantity,
            order_status = ?order.status,
            "Order item rejected"
        );

        Ok(ActionOutcome {
            order,
            notifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MarketStorage;
    use shared::order::{Notification, OrderItem, OrderRecord, OrderStatus};
    use shared::product::Product;

    fn seed(storage: &MarketStorage) -> OrderRecord {
        // Product with stock already decremented by a placed order of qty 3
        let txn = storage.begin_write().unwrap();
        storage
            .store_product(
                &txn,
                &Product {
                    id: "p1".to_string(),
                    name: "Widget".to_string(),
                    price: 10.0,
                    stock_quantity: 2,
                    seller_id: "seller-a".to_string(),
                    is_active: true,
                },
            )
            .unwrap();

        let order = OrderRecord::new(
            "order-1".to_string(),
            "cust-1".to_string(),
            vec![
                OrderItem {
                    item_id: "i1".to_string(),
                    product_id: "p1".to_string(),
                    product_name: "Widget".to_string(),
                    seller_id: "seller-a".to_string(),
                    quantity: 3,
                    price_at_purchase: 10.0,
                    status: ItemStatus::Pending,
                    refund_issued: false,
                    decided_at: None,
                },
                OrderItem {
                    item_id: "i2".to_string(),
                    product_id: "p2".to_string(),
                    product_name: "Gadget".to_string(),
                    seller_id: "seller-b".to_string(),
                    quantity: 1,
                    price_at_purchase: 5.0,
                    status: ItemStatus::Pending,
                    refund_issued: false,
                    decided_at: None,
                },
            ],
            35.0,
            now_millis(),
        );
        storage.store_order(&txn, &order).unwrap();
        for item in &order.items {
            storage
                .index_order_item(&txn, &item.item_id, &order.order_id)
                .unwrap();
        }
        storage.mark_order_open(&txn, &order.order_id).unwrap();
        txn.commit().unwrap();
        order
    }

    fn reject(
        storage: &MarketStorage,
        item_id: &str,
        seller_id: &str,
    ) -> EngineResult<ActionOutcome> {
        let action = RejectItemAction {
            item_id: item_id.to_string(),
            acting_seller_id: seller_id.to_string(),
        };
        let txn = storage.begin_write().unwrap();
        let mut ctx = ActionContext::new(&txn, storage);
        let result = futures::executor::block_on(action.execute(&mut ctx));
        if result.is_ok() {
            txn.commit().unwrap();
        }
        result
    }

    #[tokio::test]
    async fn test_reject_restores_stock() {
        let storage = MarketStorage::open_in_memory().unwrap();
        seed(&storage);

        let outcome = reject(&storage, "i1", "seller-a").unwrap();

        assert_eq!(outcome.order.item("i1").unwrap().status, ItemStatus::Rejected);
        // 2 on shelf + 3 released = 5
        assert_eq!(storage.get_product("p1").unwrap().unwrap().stock_quantity, 5);
        // No refund yet: sibling item still pending
        assert!(outcome.notifications.is_empty());
        assert!(storage.get_wallet("cust-1").unwrap().is_none());
        assert!(!outcome.order.item("i1").unwrap().refund_issued);
    }

    #[tokio::test]
    async fn test_double_reject_restores_stock_exactly_once() {
        let storage = MarketStorage::open_in_memory().unwrap();
        seed(&storage);

        reject(&storage, "i1", "seller-a").unwrap();
        let result = reject(&storage, "i1", "seller-a");
        assert!(matches!(result, Err(EngineError::AlreadyProcessed(_))));

        assert_eq!(storage.get_product("p1").unwrap().unwrap().stock_quantity, 5);
    }

    #[tokio::test]
    async fn test_rejecting_last_item_refunds_and_finalizes() {
        let storage = MarketStorage::open_in_memory().unwrap();
        seed(&storage);

        reject(&storage, "i1", "seller-a").unwrap();
        let outcome = reject(&storage, "i2", "seller-b").unwrap();

        assert_eq!(outcome.order.status, OrderStatus::Rejected);
        assert_eq!(outcome.notifications.len(), 1);
        match &outcome.notifications[0] {
            Notification::CustomerOrderRejected { total_refund, .. } => {
                assert_eq!(*total_refund, 35.0)
            }
            other => panic!("Expected CustomerOrderRejected, got {:?}", other),
        }

        // Both refunds landed in the wallet
        assert_eq!(storage.get_wallet("cust-1").unwrap().unwrap().balance, 35.0);
        assert!(outcome.order.items.iter().all(|i| i.refund_issued));
    }

    #[tokio::test]
    async fn test_wrong_seller_cannot_reject() {
        let storage = MarketStorage::open_in_memory().unwrap();
        seed(&storage);

        let result = reject(&storage, "i1", "seller-b");
        assert!(matches!(result, Err(EngineError::NotItemOwner(_))));
        assert_eq!(storage.get_product("p1").unwrap().unwrap().stock_quantity, 2);
    }

    #[tokio::test]
    async fn test_reject_survives_deleted_product() {
        let storage = MarketStorage::open_in_memory().unwrap();
        seed(&storage);

        // Item i2 references a product that no longer exists; rejection
        // still succeeds and only skips the restock
        let outcome = reject(&storage, "i2", "seller-b").unwrap();
        assert_eq!(outcome.order.item("i2").unwrap().status, ItemStatus::Rejected);
    }
}
