//! DeliverOrder action
//!
//! Records delivery of an order whose approval workflow completed with at
//! least one approved line.

use async_trait::async_trait;

use crate::actions::{ActionContext, ActionHandler, ActionOutcome};
use crate::engine::error::{EngineError, EngineResult};
use shared::order::OrderStatus;

/// DeliverOrder action
#[derive(Debug, Clone)]
pub struct DeliverOrderAction {
    pub order_id: String,
}

#[async_trait]
impl ActionHandler for DeliverOrderAction {
    async fn execute(&self, ctx: &mut ActionContext<'_>) -> EngineResult<ActionOutcome> {
        let mut order = ctx.load_order(&self.order_id)?;

        match order.status {
            OrderStatus::Approved | OrderStatus::PartiallyApproved => {}
            other => {
                return Err(EngineError::InvalidOperation(format!(
                    "Cannot mark order {} delivered from {:?} status",
                    self.order_id, other
                )));
            }
        }

        order.status = OrderStatus::Delivered;
        ctx.save_order(&mut order)?;

        tracing::info!(order_id = %self.order_id, "Order delivered");

        Ok(ActionOutcome {
            order,
            notifications: Vec::new(),
        })
    }
}
