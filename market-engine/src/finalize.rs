//! Order finalization aggregator
//!
//! Invoked after every item transition, inside the same write transaction.
//! While any item is still pending it does nothing; the moment the last
//! pending item resolves it classifies the order, issues the compensating
//! refunds, writes the terminal status, and produces the single customer
//! notification. Because the pending check and the status write share one
//! transaction, finalization fires exactly once per order even when sibling
//! items resolve concurrently.

use crate::engine::error::EngineResult;
use crate::ledger;
use crate::money::{line_total, to_f64};
use crate::storage::MarketStorage;
use redb::WriteTransaction;
use rust_decimal::Decimal;
use shared::order::{ItemStatus, Notification, OrderItem, OrderRecord, OrderStatus};

/// Terminal resolution of a fully-decided order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderResolution {
    Approved,
    Rejected,
    PartiallyApproved,
}

impl OrderResolution {
    pub fn as_status(&self) -> OrderStatus {
        match self {
            OrderResolution::Approved => OrderStatus::Approved,
            OrderResolution::Rejected => OrderStatus::Rejected,
            OrderResolution::PartiallyApproved => OrderStatus::PartiallyApproved,
        }
    }
}

/// The transition table: a resolution exists only when nothing is pending.
pub fn classify(pending: usize, approved: usize, rejected: usize) -> Option<OrderResolution> {
    if pending > 0 {
        return None;
    }
    Some(match (approved, rejected) {
        (_, 0) => OrderResolution::Approved,
        (0, _) => OrderResolution::Rejected,
        _ => OrderResolution::PartiallyApproved,
    })
}

/// Credit `price_at_purchase * quantity` back to the customer for every
/// eligible item that has not been refunded yet, marking each line in the
/// same transaction. Returns the total refunded by this call.
pub(crate) fn issue_refunds<F>(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    order: &mut OrderRecord,
    eligible: F,
) -> EngineResult<Decimal>
where
    F: Fn(&OrderItem) -> bool,
{
    let customer_id = order.customer_id.clone();
    let order_id = order.order_id.clone();
    let mut total = Decimal::ZERO;

    for item in order.items.iter_mut() {
        if item.refund_issued || !eligible(item) {
            continue;
        }
        let amount = line_total(item);
        ledger::credit(
            storage,
            txn,
            &customer_id,
            to_f64(amount),
            format!("Refund: {} (order {})", item.product_name, order_id),
        )?;
        item.refund_issued = true;
        total += amount;
    }

    Ok(total)
}

/// Finalize an order if every item has been decided.
///
/// Returns the customer notification to dispatch after commit, or `None`
/// when the order is not yet resolvable (or was already finalized, which
/// makes a racing second attempt harmless).
pub fn finalize_if_complete(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    order: &mut OrderRecord,
) -> EngineResult<Option<Notification>> {
    if order.status.is_resolved() {
        return Ok(None);
    }

    let Some(resolution) = classify(
        order.pending_count(),
        order.approved_count(),
        order.rejected_count(),
    ) else {
        return Ok(None);
    };

    let total_refund = issue_refunds(storage, txn, order, |item| {
        item.status == ItemStatus::Rejected
    })?;

    order.status = resolution.as_status();
    storage.mark_order_closed(txn, &order.order_id)?;

    tracing::info!(
        order_id = %order.order_id,
        resolution = ?resolution,
        total_refund = %total_refund,
        "Order finalized"
    );

    let notification = match resolution {
        OrderResolution::Approved => Notification::CustomerOrderApproved {
            customer_id: order.customer_id.clone(),
            order_id: order.order_id.clone(),
            items: order.items.clone(),
        },
        OrderResolution::Rejected => Notification::CustomerOrderRejected {
            customer_id: order.customer_id.clone(),
            order_id: order.order_id.clone(),
            items: order.items.clone(),
            total_refund: to_f64(total_refund),
        },
        OrderResolution::PartiallyApproved => Notification::CustomerPartialRejection {
            customer_id: order.customer_id.clone(),
            order_id: order.order_id.clone(),
            rejected_items: order
                .items
                .iter()
                .filter(|i| i.status == ItemStatus::Rejected)
                .cloned()
                .collect(),
            total_refund: to_f64(total_refund),
        },
    };

    Ok(Some(notification))
}
