//! Shared types for the marketplace order engine
//!
//! Domain types used by the engine crate and by callers embedding it:
//! products, carts, wallets, orders with their per-seller items, operation
//! result DTOs, and customer/seller notification payloads.

pub mod cart;
pub mod order;
pub mod product;
pub mod util;
pub mod wallet;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use cart::{Cart, CartItem};
pub use product::Product;
pub use wallet::{TransactionKind, Wallet, WalletTransaction};
