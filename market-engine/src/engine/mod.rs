//! MarketEngine - the order and wallet processing service
//!
//! Every mutating operation follows the same shape:
//!
//! ```text
//! operation(args)
//!     ├─ 1. Begin write transaction
//!     ├─ 2. Build the action and execute it against the context
//!     ├─ 3. Commit (redb serializes writers, so the whole operation
//!     │      is atomic and per-entity races cannot interleave)
//!     ├─ 4. Dispatch notifications (best-effort, post-commit)
//!     └─ 5. Return a typed result DTO
//! ```

pub mod error;

use crate::actions::{
    ActionContext, ActionHandler, ActionOutcome, ApproveItemAction, CancelOrderAction,
    DeliverOrderAction, OrderAction, PlaceOrderAction, RejectItemAction,
};
use crate::config::Config;
use crate::notify::NotificationHub;
use crate::storage::{MarketStorage, StorageError, StorageStats};
use crate::{carts, catalog, ledger};
use chrono::Duration;
use error::{EngineError, EngineResult};
use shared::cart::Cart;
use shared::order::{
    Notification, OrderItemResult, OrderRecord, OrderResult, WalletTransactionResult,
};
use shared::product::Product;
use shared::util::now_millis;
use shared::wallet::{Wallet, WalletTransaction};
use std::path::Path;
use tokio::sync::broadcast;

const DEFAULT_NOTIFY_CAPACITY: usize = 1024;
const DEFAULT_DELIVERY_WINDOW_DAYS: i64 = 5;

/// Marketplace order engine
///
/// The `epoch` field is a unique identifier generated on each startup;
/// clients can use it to detect engine restarts.
pub struct MarketEngine {
    storage: MarketStorage,
    notifications: NotificationHub,
    /// Engine instance epoch - unique ID generated on startup
    epoch: String,
    /// Days added to the placement time as the estimated delivery
    delivery_window_days: i64,
}

impl std::fmt::Debug for MarketEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketEngine")
            .field("storage", &"<MarketStorage>")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl MarketEngine {
    /// Create a new engine with the given database path
    pub fn new(db_path: impl AsRef<Path>) -> EngineResult<Self> {
        let storage = MarketStorage::open(db_path)?;
        Ok(Self::with_parts(
            storage,
            DEFAULT_NOTIFY_CAPACITY,
            DEFAULT_DELIVERY_WINDOW_DAYS,
        ))
    }

    /// Create an engine from configuration
    pub fn from_config(config: &Config) -> EngineResult<Self> {
        let storage = MarketStorage::open(config.db_path())?;
        Ok(Self::with_parts(
            storage,
            config.notify_capacity,
            config.delivery_window_days,
        ))
    }

    /// Create an engine with existing storage (for testing)
    #[cfg(test)]
    pub fn with_storage(storage: MarketStorage) -> Self {
        Self::with_parts(storage, DEFAULT_NOTIFY_CAPACITY, DEFAULT_DELIVERY_WINDOW_DAYS)
    }

    fn with_parts(storage: MarketStorage, notify_capacity: usize, delivery_window_days: i64) -> Self {
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "MarketEngine started with new epoch");
        Self {
            storage,
            notifications: NotificationHub::new(notify_capacity),
            epoch,
            delivery_window_days,
        }
    }

    /// Get the engine epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to notification broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &MarketStorage {
        &self.storage
    }

    /// Execute an action in one write transaction and dispatch its
    /// notifications after the commit
    fn run_action(&self, action: OrderAction) -> EngineResult<ActionOutcome> {
        let txn = self.storage.begin_write()?;
        let mut ctx = ActionContext::new(&txn, &self.storage);
        let outcome = futures::executor::block_on(action.execute(&mut ctx))?;
        txn.commit().map_err(StorageError::from)?;

        for notification in &outcome.notifications {
            self.notifications.dispatch(notification.clone());
        }
        Ok(outcome)
    }

    // ========== Order Lifecycle ==========

    /// Convert the customer's cart into an order, reserving stock and funds
    /// atomically. Sellers are notified of their items after commit.
    pub fn place_order(&self, customer_id: &str) -> EngineResult<OrderResult> {
        require_id(customer_id, "customer_id")?;
        let estimated_delivery = now_millis()
            + Duration::days(self.delivery_window_days)
                .num_milliseconds();
        let outcome = self.run_action(OrderAction::PlaceOrder(PlaceOrderAction {
            customer_id: customer_id.to_string(),
            estimated_delivery,
        }))?;

        let debited = outcome.order.total_amount;
        Ok(OrderResult {
            order: outcome.order,
            debited,
        })
    }

    /// Approve one order item on behalf of the seller owning it
    pub fn approve_item(
        &self,
        item_id: &str,
        acting_seller_id: &str,
    ) -> EngineResult<OrderItemResult> {
        require_id(item_id, "item_id")?;
        require_id(acting_seller_id, "acting_seller_id")?;
        let outcome = self.run_action(OrderAction::ApproveItem(ApproveItemAction {
            item_id: item_id.to_string(),
            acting_seller_id: acting_seller_id.to_string(),
        }))?;
        item_result(outcome, item_id)
    }

    /// Reject one order item on behalf of the seller owning it, releasing
    /// its stock reservation
    pub fn reject_item(
        &self,
        item_id: &str,
        acting_seller_id: &str,
    ) -> EngineResult<OrderItemResult> {
        require_id(item_id, "item_id")?;
        require_id(acting_seller_id, "acting_seller_id")?;
        let outcome = self.run_action(OrderAction::RejectItem(RejectItemAction {
            item_id: item_id.to_string(),
            acting_seller_id: acting_seller_id.to_string(),
        }))?;
        item_result(outcome, item_id)
    }

    /// Cancel a fully-pending order, restoring stock and refunding the
    /// whole debit
    pub fn cancel_order(
        &self,
        order_id: &str,
        acting_customer_id: &str,
    ) -> EngineResult<OrderResult> {
        require_id(order_id, "order_id")?;
        require_id(acting_customer_id, "acting_customer_id")?;
        let outcome = self.run_action(OrderAction::CancelOrder(CancelOrderAction {
            order_id: order_id.to_string(),
            acting_customer_id: acting_customer_id.to_string(),
        }))?;
        Ok(OrderResult {
            debited: outcome.order.total_amount,
            order: outcome.order,
        })
    }

    /// Mark a resolved order as delivered
    pub fn mark_delivered(&self, order_id: &str) -> EngineResult<OrderResult> {
        require_id(order_id, "order_id")?;
        let outcome = self.run_action(OrderAction::DeliverOrder(DeliverOrderAction {
            order_id: order_id.to_string(),
        }))?;
        Ok(OrderResult {
            debited: outcome.order.total_amount,
            order: outcome.order,
        })
    }

    // ========== Wallet ==========

    /// Add funds to a customer's wallet, creating it on first use
    pub fn add_funds(
        &self,
        customer_id: &str,
        amount: f64,
        description: &str,
    ) -> EngineResult<WalletTransactionResult> {
        require_id(customer_id, "customer_id")?;
        let txn = self.storage.begin_write()?;
        let transaction =
            ledger::deposit(&self.storage, &txn, customer_id, amount, description.to_string())?;
        let wallet = self
            .storage
            .get_wallet_txn(&txn, customer_id)?
            .ok_or_else(|| EngineError::WalletNotFound(customer_id.to_string()))?;
        txn.commit().map_err(StorageError::from)?;

        Ok(WalletTransactionResult {
            transaction,
            balance: wallet.balance,
        })
    }

    /// Get a customer's wallet
    pub fn wallet(&self, customer_id: &str) -> EngineResult<Wallet> {
        self.storage
            .get_wallet(customer_id)?
            .ok_or_else(|| EngineError::WalletNotFound(customer_id.to_string()))
    }

    /// Get a customer's full transaction history, ordered by sequence
    pub fn wallet_transactions(&self, customer_id: &str) -> EngineResult<Vec<WalletTransaction>> {
        Ok(self.storage.wallet_transactions(customer_id)?)
    }

    // ========== Catalog ==========

    /// Create or replace a product listing
    pub fn upsert_product(&self, product: &Product) -> EngineResult<()> {
        require_id(&product.id, "product.id")?;
        require_id(&product.seller_id, "product.seller_id")?;
        let txn = self.storage.begin_write()?;
        catalog::upsert_product(&self.storage, &txn, product)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(())
    }

    /// Adjust a product's stock by a signed delta (restock or correction)
    pub fn adjust_stock(&self, product_id: &str, delta: i32) -> EngineResult<Product> {
        require_id(product_id, "product_id")?;
        let txn = self.storage.begin_write()?;
        let product = catalog::adjust_stock(&self.storage, &txn, product_id, delta)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(product)
    }

    /// Get a product by ID
    pub fn get_product(&self, product_id: &str) -> EngineResult<Product> {
        self.storage
            .get_product(product_id)?
            .ok_or_else(|| EngineError::ProductNotFound(product_id.to_string()))
    }

    // ========== Cart ==========

    /// Add quantity of a product to a customer's cart
    pub fn add_to_cart(
        &self,
        customer_id: &str,
        product_id: &str,
        quantity: i32,
    ) -> EngineResult<Cart> {
        require_id(customer_id, "customer_id")?;
        require_id(product_id, "product_id")?;
        let txn = self.storage.begin_write()?;
        let cart = carts::add_to_cart(&self.storage, &txn, customer_id, product_id, quantity)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }

    /// Remove a product line from a customer's cart
    pub fn remove_from_cart(&self, customer_id: &str, product_id: &str) -> EngineResult<Cart> {
        require_id(customer_id, "customer_id")?;
        let txn = self.storage.begin_write()?;
        let cart = carts::remove_from_cart(&self.storage, &txn, customer_id, product_id)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }

    /// Empty a customer's cart
    pub fn clear_cart(&self, customer_id: &str) -> EngineResult<Cart> {
        require_id(customer_id, "customer_id")?;
        let txn = self.storage.begin_write()?;
        let cart = carts::clear_cart(&self.storage, &txn, customer_id)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(cart)
    }

    /// Get a customer's cart (an empty cart if none was stored yet)
    pub fn get_cart(&self, customer_id: &str) -> EngineResult<Cart> {
        Ok(self
            .storage
            .get_cart(customer_id)?
            .unwrap_or_else(|| Cart::new(customer_id)))
    }

    // ========== Queries ==========

    /// Get an order by ID
    pub fn get_order(&self, order_id: &str) -> EngineResult<OrderRecord> {
        self.storage
            .get_order(order_id)?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))
    }

    /// Get all orders placed by a customer
    pub fn orders_for_customer(&self, customer_id: &str) -> EngineResult<Vec<OrderRecord>> {
        Ok(self.storage.orders_for_customer(customer_id)?)
    }

    /// Get all orders containing at least one item of a seller
    pub fn orders_for_seller(&self, seller_id: &str) -> EngineResult<Vec<OrderRecord>> {
        Ok(self.storage.orders_for_seller(seller_id)?)
    }

    /// Get the IDs of orders that still have pending items
    pub fn open_order_ids(&self) -> EngineResult<Vec<String>> {
        Ok(self.storage.open_order_ids()?)
    }

    /// Get storage statistics
    pub fn stats(&self) -> EngineResult<StorageStats> {
        Ok(self.storage.stats()?)
    }
}

// Make MarketEngine Clone-able (storage and hub are shared handles)
impl Clone for MarketEngine {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            notifications: self.notifications.clone(),
            epoch: self.epoch.clone(),
            delivery_window_days: self.delivery_window_days,
        }
    }
}

/// Malformed (empty) IDs are rejected before touching storage
fn require_id(value: &str, field_name: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::InvalidOperation(format!(
            "{} must not be empty",
            field_name
        )));
    }
    Ok(())
}

/// Build the item-level DTO out of an action outcome
fn item_result(outcome: ActionOutcome, item_id: &str) -> EngineResult<OrderItemResult> {
    let item = outcome
        .order
        .item(item_id)
        .cloned()
        .ok_or_else(|| EngineError::ItemNotFound(item_id.to_string()))?;
    Ok(OrderItemResult {
        item,
        order_id: outcome.order.order_id.clone(),
        order_status: outcome.order.status,
    })
}
