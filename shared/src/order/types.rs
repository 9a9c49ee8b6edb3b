//! Core order status and item types

use serde::{Deserialize, Serialize};

// ============================================================================
// Statuses
// ============================================================================

/// Order-level status.
///
/// Only the finalization aggregator ever writes the terminal resolution
/// statuses; callers never set them directly. The transition is write-once:
/// `Pending` → one of {`Approved`, `Rejected`, `PartiallyApproved`,
/// `Cancelled`}, and `Approved`/`PartiallyApproved` → `Delivered`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// At least one item still awaits a seller decision
    #[default]
    Pending,
    /// Some items approved, some rejected; rejected lines refunded
    PartiallyApproved,
    /// Every item approved
    Approved,
    /// Every item rejected; full amount refunded
    Rejected,
    /// Cancelled by the customer before any seller decision
    Cancelled,
    /// Goods confirmed delivered
    Delivered,
}

impl OrderStatus {
    /// True once the approval workflow has produced a resolution
    pub fn is_resolved(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

/// Per-item status. Write-once: `Pending` → `Approved` or `Rejected`,
/// never reversed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

// ============================================================================
// Order items
// ============================================================================

/// One product line of an order, owned by exactly one seller.
///
/// `seller_id`, `product_name` and `price_at_purchase` are snapshots taken
/// at placement time so the line survives later product changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Item ID (unique across all orders)
    pub item_id: String,
    pub product_id: String,
    /// Product name snapshot
    pub product_name: String,
    /// Seller snapshot (denormalized from the product at creation)
    pub seller_id: String,
    pub quantity: i32,
    /// Price snapshot; the refund for a rejected line is exactly
    /// `price_at_purchase * quantity`
    pub price_at_purchase: f64,
    pub status: ItemStatus,
    /// Set in the same transaction as the refund Credit row, so re-running
    /// finalization never refunds a line twice
    #[serde(default)]
    pub refund_issued: bool,
    /// When the seller decided (or the order was cancelled)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<i64>,
}

impl OrderItem {
    pub fn is_pending(&self) -> bool {
        self.status == ItemStatus::Pending
    }
}
