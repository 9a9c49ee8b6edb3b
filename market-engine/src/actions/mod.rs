//! Order action implementations
//!
//! Each action implements the `ActionHandler` trait, runs entirely inside
//! the caller's write transaction, and returns the updated order plus the
//! notifications to dispatch after commit.

use async_trait::async_trait;

use crate::engine::error::{EngineError, EngineResult};
use crate::storage::MarketStorage;
use redb::WriteTransaction;
use shared::order::{Notification, OrderRecord};

mod approve_item;
mod cancel_order;
mod deliver_order;
mod place_order;
mod reject_item;

pub use approve_item::ApproveItemAction;
pub use cancel_order::CancelOrderAction;
pub use deliver_order::DeliverOrderAction;
pub use place_order::PlaceOrderAction;
pub use reject_item::RejectItemAction;

/// Transaction-scoped context handed to actions
pub struct ActionContext<'a> {
    pub txn: &'a WriteTransaction,
    pub storage: &'a MarketStorage,
}

impl<'a> ActionContext<'a> {
    pub fn new(txn: &'a WriteTransaction, storage: &'a MarketStorage) -> Self {
        Self { txn, storage }
    }

    /// Load an order or fail with `OrderNotFound`
    pub fn load_order(&self, order_id: &str) -> EngineResult<OrderRecord> {
        self.storage
            .get_order_txn(self.txn, order_id)?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))
    }

    /// Resolve an item to its parent order via the item index
    pub fn load_order_for_item(&self, item_id: &str) -> EngineResult<OrderRecord> {
        let order_id = self
            .storage
            .find_order_for_item_txn(self.txn, item_id)?
            .ok_or_else(|| EngineError::ItemNotFound(item_id.to_string()))?;
        self.load_order(&order_id)
    }

    /// Persist an order, refreshing its `updated_at`
    pub fn save_order(&self, order: &mut OrderRecord) -> EngineResult<()> {
        order.touch();
        self.storage.store_order(self.txn, order)?;
        Ok(())
    }
}

/// What an action produced: the order after the mutation and the
/// notifications to dispatch once the transaction has committed.
pub struct ActionOutcome {
    pub order: OrderRecord,
    pub notifications: Vec<Notification>,
}

/// Handler trait implemented by every action
#[async_trait]
pub trait ActionHandler {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> EngineResult<ActionOutcome>;
}

/// OrderAction enum - dispatches to concrete action implementations
pub enum OrderAction {
    PlaceOrder(PlaceOrderAction),
    ApproveItem(ApproveItemAction),
    RejectItem(RejectItemAction),
    CancelOrder(CancelOrderAction),
    DeliverOrder(DeliverOrderAction),
}

#[async_trait]
impl ActionHandler for OrderAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> EngineResult<ActionOutcome> {
        match self {
            OrderAction::PlaceOrder(action) => action.execute(ctx).await,
            OrderAction::ApproveItem(action) => action.execute(ctx).await,
            OrderAction::RejectItem(action) => action.execute(ctx).await,
            OrderAction::CancelOrder(action) => action.execute(ctx).await,
            OrderAction::DeliverOrder(action) => action.execute(ctx).await,
        }
    }
}
