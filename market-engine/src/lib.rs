//! Marketplace Order & Wallet Engine
//!
//! This crate implements a multi-seller order lifecycle over an embedded,
//! transactional store:
//!
//! - **engine**: `MarketEngine` - operation processing and result DTOs
//! - **storage**: redb-based persistence for products, carts, wallets,
//!   ledger entries, orders and their indexes
//! - **actions**: one handler per mutating operation (place, approve,
//!   reject, cancel, deliver)
//! - **finalize**: the order finalization aggregator and refund bookkeeping
//! - **ledger**: wallet debit/credit/deposit with an append-only audit trail
//!
//! # Architecture
//!
//! ```text
//! Operation → MarketEngine → Action (one write transaction)
//!                  ↓               ├─ stock reservation / release
//!               Broadcast          ├─ wallet debit / refunds
//!                  ↓               └─ finalization check
//!            All Subscribers
//! ```
//!
//! # Data Flow
//!
//! 1. A caller invokes an engine operation (e.g. `place_order`)
//! 2. The engine opens one redb write transaction and runs the action
//! 3. Stock, wallet, order and index mutations all commit together
//! 4. Notifications are broadcast to subscribers after the commit
//! 5. A typed result DTO is returned to the caller

pub mod actions;
pub mod carts;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod finalize;
pub mod ledger;
pub mod logger;
pub mod money;
pub mod notify;
pub mod storage;

// Re-exports
pub use config::Config;
pub use engine::error::{EngineError, EngineResult};
pub use engine::MarketEngine;
pub use logger::init_logger;
pub use notify::NotificationHub;
pub use storage::{MarketStorage, StorageError, StorageStats};

// Re-export shared types for convenience
pub use shared::order::{
    ItemStatus, Notification, OpError, OpErrorCode, OrderItemResult, OrderRecord, OrderResult,
    OrderStatus, WalletTransactionResult,
};
pub use shared::{Cart, CartItem, Product, TransactionKind, Wallet, WalletTransaction};
