//! Order types: statuses, items, records, operation results, notifications

pub mod notification;
pub mod record;
pub mod response;
pub mod types;

// Re-exports
pub use notification::Notification;
pub use record::OrderRecord;
pub use response::{OpError, OpErrorCode, OrderItemResult, OrderResult, WalletTransactionResult};
pub use types::{ItemStatus, OrderItem, OrderStatus};
