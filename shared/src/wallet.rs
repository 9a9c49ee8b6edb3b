//! Wallet and ledger transaction types
//!
//! The transaction log is the audit source of truth; `Wallet.balance` is a
//! cached running total that must always equal the signed sum of the
//! wallet's transactions.

use serde::{Deserialize, Serialize};

/// A customer's closed-loop balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wallet {
    pub customer_id: String,
    /// Cached running total; never driven negative by a debit
    pub balance: f64,
    pub last_updated: i64,
}

/// Ledger entry direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Funds added by the customer
    Deposit,
    /// Funds reserved at order placement
    Debit,
    /// Refund of a rejected or cancelled item
    Credit,
}

impl TransactionKind {
    /// True for entries that increase the balance
    pub fn is_inflow(&self) -> bool {
        matches!(self, TransactionKind::Deposit | TransactionKind::Credit)
    }
}

/// One immutable ledger entry. `seq` is a global, monotonically increasing
/// sequence assigned at append time; entries for a wallet are totally
/// ordered by it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WalletTransaction {
    pub tx_id: String,
    pub customer_id: String,
    pub seq: u64,
    /// Always positive; direction comes from `kind`
    pub amount: f64,
    pub kind: TransactionKind,
    pub description: String,
    pub created_at: i64,
}
