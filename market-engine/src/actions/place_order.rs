//! PlaceOrder action
//!
//! Converts a customer's cart into an order split across its sellers,
//! reserving stock and funds in the same transaction. Validation is
//! whole-cart: if any line fails the stock or funds check, nothing is
//! applied.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::actions::{ActionContext, ActionHandler, ActionOutcome};
use crate::catalog;
use crate::engine::error::{EngineError, EngineResult};
use crate::ledger;
use crate::money::{self, covers, to_decimal, to_f64};
use shared::cart::CartItem;
use shared::order::{ItemStatus, Notification, OrderItem, OrderRecord};
use shared::product::Product;

/// PlaceOrder action
#[derive(Debug, Clone)]
pub struct PlaceOrderAction {
    pub customer_id: String,
    /// Estimated delivery time (Unix milliseconds), set by the engine from
    /// its configured delivery window
    pub estimated_delivery: i64,
}

#[async_trait]
impl ActionHandler for PlaceOrderAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> EngineResult<ActionOutcome> {
        // 1. Load the cart; placement requires a non-empty one
        let mut cart = ctx
            .storage
            .get_cart_txn(ctx.txn, &self.customer_id)?
            .ok_or_else(|| EngineError::EmptyCart(self.customer_id.clone()))?;
        if cart.is_empty() {
            return Err(EngineError::EmptyCart(self.customer_id.clone()));
        }

        // 2. Whole-cart stock validation before any mutation. The order is
        //    placed as one unit, so the first failing line aborts everything.
        let mut lines: Vec<(CartItem, Product)> = Vec::with_capacity(cart.items.len());
        for cart_item in &cart.items {
            money::validate_quantity(cart_item.quantity)?;
            let product = ctx
                .storage
                .get_product_txn(ctx.txn, &cart_item.product_id)?
                .ok_or_else(|| EngineError::ProductNotFound(cart_item.product_id.clone()))?;
            if !product.is_active {
                return Err(EngineError::ProductInactive(product.id.clone()));
            }
            if product.stock_quantity < cart_item.quantity {
                return Err(EngineError::InsufficientStock(product.id.clone()));
            }
            lines.push((cart_item.clone(), product));
        }

        // 3. Total and funds check against the whole cart
        let total: Decimal = lines
            .iter()
            .map(|(item, product)| to_decimal(product.price) * Decimal::from(item.quantity))
            .sum();
        let total = to_f64(total);

        let wallet = ctx.storage.get_wallet_txn(ctx.txn, &self.customer_id)?;
        let available = wallet.as_ref().map(|w| w.balance).unwrap_or(0.0);
        if wallet.is_none() || !covers(available, total) {
            return Err(EngineError::InsufficientFunds {
                required: total,
                available,
            });
        }

        // 4. Construct the order with per-line seller and price snapshots
        let order_id = uuid::Uuid::new_v4().to_string();
        let items: Vec<OrderItem> = lines
            .iter()
            .map(|(cart_item, product)| OrderItem {
                item_id: uuid::Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                seller_id: product.seller_id.clone(),
                quantity: cart_item.quantity,
                price_at_purchase: product.price,
                status: ItemStatus::Pending,
                refund_issued: false,
                decided_at: None,
            })
            .collect();
        let mut order = OrderRecord::new(
            order_id.clone(),
            self.customer_id.clone(),
            items,
            total,
            self.estimated_delivery,
        );

        // 5. Reserve stock
        for (cart_item, product) in &lines {
            catalog::decrement_stock(ctx.storage, ctx.txn, &product.id, cart_item.quantity)?;
        }

        // 6. Reserve funds: one Debit for the whole order
        ledger::debit(
            ctx.storage,
            ctx.txn,
            &self.customer_id,
            total,
            format!("Payment for order {}", order_id),
        )?;

        // 7. Remove the purchased lines; the cart row itself is retained
        let purchased: Vec<String> = lines
            .iter()
            .map(|(item, _)| item.product_id.clone())
            .collect();
        cart.remove_purchased(&purchased);
        ctx.storage.store_cart(ctx.txn, &cart)?;

        // 8. Persist order and indexes
        ctx.save_order(&mut order)?;
        for item in &order.items {
            ctx.storage
                .index_order_item(ctx.txn, &item.item_id, &order_id)?;
        }
        ctx.storage
            .link_customer_order(ctx.txn, &self.customer_id, &order_id)?;
        for seller_id in order.seller_ids() {
            ctx.storage
                .link_seller_order(ctx.txn, &seller_id, &order_id)?;
        }
        ctx.storage.mark_order_open(ctx.txn, &order_id)?;

        tracing::info!(
            order_id = %order_id,
            customer_id = %self.customer_id,
            total = total,
            item_count = order.items.len(),
            "Order placed"
        );

        // 9. One notification per affected seller, dispatched after commit
        let notifications = order
            .seller_ids()
            .into_iter()
            .map(|seller_id| Notification::SellerNewItems {
                items: order.items_for_seller(&seller_id),
                seller_id,
                order_id: order_id.clone(),
            })
            .collect();

        Ok(ActionOutcome {
            order,
            notifications,
        })
    }
}
