//! CancelOrder action
//!
//! A customer withdraws an order before any seller has acted on it. The
//! whole reservation unwinds: every line's stock goes back to inventory and
//! the full debit is refunded line by line, using the same refund
//! bookkeeping as finalization.

use async_trait::async_trait;

use crate::actions::{ActionContext, ActionHandler, ActionOutcome};
use crate::catalog;
use crate::engine::error::{EngineError, EngineResult};
use crate::finalize;
use crate::money::to_f64;
use shared::order::{Notification, OrderStatus};

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
    pub acting_customer_id: String,
}

#[async_trait]
impl ActionHandler for CancelOrderAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> EngineResult<ActionOutcome> {
        let mut order = ctx.load_order(&self.order_id)?;

        if order.customer_id != self.acting_customer_id {
            return Err(EngineError::NotOrderOwner(self.order_id.clone()));
        }

        // Cancellation is only possible while no seller has decided anything
        if order.status != OrderStatus::Pending || order.pending_count() != order.items.len() {
            return Err(EngineError::InvalidOperation(format!(
                "Cannot cancel order {} once sellers have started deciding",
                self.order_id
            )));
        }

        for item in &order.items {
            catalog::restore_stock(ctx.storage, ctx.txn, &item.product_id, item.quantity)?;
        }

        let total_refund = finalize::issue_refunds(ctx.storage, ctx.txn, &mut order, |_| true)?;

        order.status = OrderStatus::Cancelled;
        ctx.storage.mark_order_closed(ctx.txn, &self.order_id)?;
        ctx.save_order(&mut order)?;

        tracing::info!(
            order_id = %self.order_id,
            customer_id = %self.acting_customer_id,
            total_refund = %total_refund,
            "Order cancelled"
        );

        let notification = Notification::CustomerOrderCancelled {
            customer_id: order.customer_id.clone(),
            order_id: order.order_id.clone(),
            total_refund: to_f64(total_refund),
        };

        Ok(ActionOutcome {
            order,
            notifications: vec![notification],
        })
    }
}
