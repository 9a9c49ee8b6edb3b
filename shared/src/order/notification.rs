//! Notifications emitted after an order transaction commits
//!
//! Dispatch is best-effort and fire-and-forget: a failed or unobserved
//! notification never rolls back order, stock or wallet state.

use super::types::OrderItem;
use serde::{Deserialize, Serialize};

/// A notification for a seller or a customer.
///
/// Customer-facing variants summarize the whole order's outcome; they are
/// produced exactly once, by finalization (or cancellation), never per item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Notification {
    /// New order items awaiting this seller's decision
    SellerNewItems {
        seller_id: String,
        order_id: String,
        items: Vec<OrderItem>,
    },
    /// Every item of the order was approved
    CustomerOrderApproved {
        customer_id: String,
        order_id: String,
        items: Vec<OrderItem>,
    },
    /// Every item of the order was rejected; the full amount was refunded
    CustomerOrderRejected {
        customer_id: String,
        order_id: String,
        items: Vec<OrderItem>,
        total_refund: f64,
    },
    /// Some items were rejected and refunded, the rest were approved
    CustomerPartialRejection {
        customer_id: String,
        order_id: String,
        rejected_items: Vec<OrderItem>,
        total_refund: f64,
    },
    /// The order was cancelled by the customer and fully refunded
    CustomerOrderCancelled {
        customer_id: String,
        order_id: String,
        total_refund: f64,
    },
}

impl Notification {
    /// Order this notification refers to
    pub fn order_id(&self) -> &str {
        match self {
            Notification::SellerNewItems { order_id, .. }
            | Notification::CustomerOrderApproved { order_id, .. }
            | Notification::CustomerOrderRejected { order_id, .. }
            | Notification::CustomerPartialRejection { order_id, .. }
            | Notification::CustomerOrderCancelled { order_id, .. } => order_id,
        }
    }

    /// True for the once-per-order customer outcome variants
    pub fn is_customer_outcome(&self) -> bool {
        !matches!(self, Notification::SellerNewItems { .. })
    }
}
