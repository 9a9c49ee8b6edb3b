//! Wallet ledger operations
//!
//! Every mutation appends exactly one `WalletTransaction` and updates the
//! cached balance in the same write transaction, so the balance always
//! equals the signed sum of the wallet's entries. Debits are pre-validated
//! by callers (order placement checks the whole-cart total first), but the
//! ledger itself still refuses to drive a balance negative.

use crate::engine::error::{EngineError, EngineResult};
use crate::money::{self, to_decimal, to_f64};
use crate::storage::MarketStorage;
use redb::WriteTransaction;
use shared::util::now_millis;
use shared::wallet::{TransactionKind, Wallet, WalletTransaction};

fn append_entry(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    wallet: &mut Wallet,
    amount: f64,
    kind: TransactionKind,
    description: String,
) -> EngineResult<WalletTransaction> {
    let seq = storage.next_ledger_seq(txn)?;
    let entry = WalletTransaction {
        tx_id: uuid::Uuid::new_v4().to_string(),
        customer_id: wallet.customer_id.clone(),
        seq,
        amount,
        kind,
        description,
        created_at: now_millis(),
    };
    storage.append_wallet_tx(txn, &entry)?;
    wallet.last_updated = entry.created_at;
    storage.store_wallet(txn, wallet)?;

    // Audit trail: the `ledger` target is routed to its own permanent log
    tracing::info!(
        target: "ledger",
        customer_id = %entry.customer_id,
        seq = entry.seq,
        kind = ?entry.kind,
        amount = entry.amount,
        balance = wallet.balance,
        description = %entry.description,
        "Ledger entry appended"
    );

    Ok(entry)
}

/// Add funds to a customer's wallet, creating the wallet on first deposit
pub fn deposit(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    customer_id: &str,
    amount: f64,
    description: String,
) -> EngineResult<WalletTransaction> {
    money::validate_amount(amount)?;
    let mut wallet = storage
        .get_wallet_txn(txn, customer_id)?
        .unwrap_or_else(|| Wallet {
            customer_id: customer_id.to_string(),
            balance: 0.0,
            last_updated: now_millis(),
        });
    wallet.balance = to_f64(to_decimal(wallet.balance) + to_decimal(amount));
    append_entry(storage, txn, &mut wallet, amount, TransactionKind::Deposit, description)
}

/// Debit a wallet. Fails with `WalletNotFound` when the customer has no
/// wallet and `InsufficientFunds` when the balance does not cover the
/// amount.
pub fn debit(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    customer_id: &str,
    amount: f64,
    description: String,
) -> EngineResult<WalletTransaction> {
    money::validate_amount(amount)?;
    let mut wallet = storage
        .get_wallet_txn(txn, customer_id)?
        .ok_or_else(|| EngineError::WalletNotFound(customer_id.to_string()))?;

    // Strict comparison: the ledger never lets its own debit path create a
    // negative balance
    let balance = to_decimal(wallet.balance);
    let debit = to_decimal(amount);
    if balance < debit {
        return Err(EngineError::InsufficientFunds {
            required: amount,
            available: wallet.balance,
        });
    }

    wallet.balance = to_f64(balance - debit);
    append_entry(storage, txn, &mut wallet, amount, TransactionKind::Debit, description)
}

/// Credit (refund) a wallet. Money returning to the customer is never
/// rejected; a missing wallet is recreated rather than failing the refund.
pub fn credit(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    customer_id: &str,
    amount: f64,
    description: String,
) -> EngineResult<WalletTransaction> {
    money::validate_amount(amount)?;
    let mut wallet = match storage.get_wallet_txn(txn, customer_id)? {
        Some(wallet) => wallet,
        None => {
            tracing::warn!(customer_id = %customer_id, "Refund to missing wallet, recreating");
            Wallet {
                customer_id: customer_id.to_string(),
                balance: 0.0,
                last_updated: now_millis(),
            }
        }
    };
    wallet.balance = to_f64(to_decimal(wallet.balance) + to_decimal(amount));
    append_entry(storage, txn, &mut wallet, amount, TransactionKind::Credit, description)
}
