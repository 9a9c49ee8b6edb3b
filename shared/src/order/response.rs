//! Operation result DTOs and wire-facing error codes
//!
//! Every engine operation returns a fixed-shape result record so callers
//! (and tests) never depend on loosely-typed payloads.

use super::record::OrderRecord;
use super::types::{OrderItem, OrderStatus};
use crate::wallet::WalletTransaction;
use serde::{Deserialize, Serialize};

/// Result of a successful order placement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderResult {
    /// The created order with nested items
    pub order: OrderRecord,
    /// Amount debited from the wallet; always equals `order.total_amount`
    pub debited: f64,
}

/// Result of an item approval or rejection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemResult {
    pub item: OrderItem,
    pub order_id: String,
    /// Parent order status after this call, so a seller sees immediately
    /// whether their decision completed the order
    pub order_status: OrderStatus,
}

/// Result of a wallet mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletTransactionResult {
    pub transaction: WalletTransaction,
    /// Balance after the mutation
    pub balance: f64,
}

/// Wire-facing error with a stable code (callers localize the message)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpError {
    pub code: OpErrorCode,
    pub message: String,
}

impl OpError {
    pub fn new(code: OpErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Operation error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpErrorCode {
    OrderNotFound,
    ItemNotFound,
    ProductNotFound,
    WalletNotFound,
    EmptyCart,
    InsufficientStock,
    InsufficientFunds,
    AlreadyProcessed,
    NotItemOwner,
    NotOrderOwner,
    ProductInactive,
    InvalidOperation,
    InternalError,
    // Storage errors
    StorageFull,
    OutOfMemory,
    StorageCorrupted,
    SystemBusy,
}
