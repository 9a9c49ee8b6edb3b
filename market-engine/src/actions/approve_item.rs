//! ApproveItem action
//!
//! A seller confirms one of their order lines. Stock and funds were already
//! reserved at placement, so approval only flips the item status and lets
//! the finalization aggregator decide whether the order is now complete.

use async_trait::async_trait;

use crate::actions::{ActionContext, ActionHandler, ActionOutcome};
use crate::engine::error::{EngineError, EngineResult};
use crate::finalize;
use shared::order::ItemStatus;
use shared::util::now_millis;

/// ApproveItem action
#[derive(Debug, Clone)]
pub struct ApproveItemAction {
    pub item_id: String,
    pub acting_seller_id: String,
}

#[async_trait]
impl ActionHandler for ApproveItemAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> EngineResult<ActionOutcome> {
        let mut order = ctx.load_order_for_item(&self.item_id)?;
        let item = order
            .item_mut(&self.item_id)
            .ok_or_else(|| EngineError::ItemNotFound(self.item_id.clone()))?;

        // Ownership before any state inspection
        if item.seller_id != self.acting_seller_id {
            return Err(EngineError::NotItemOwner(self.item_id.clone()));
        }

        // Pending -> Approved is the only allowed transition; a duplicate
        // call observes the terminal state and reports it as a benign no-op
        if item.status != ItemStatus::Pending {
            return Err(EngineError::AlreadyProcessed(self.item_id.clone()));
        }

        item.status = ItemStatus::Approved;
        item.decided_at = Some(now_millis());

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
            order_status = ?order.status,
            "Order item approved"
        );

        Ok(ActionOutcome {
            order,
            notifications,
        })
    }
}
