//! redb-based storage layer for the marketplace engine
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `products` | `product_id` | `Product` | Catalog with live stock |
//! | `carts` | `customer_id` | `Cart` | Pre-purchase carts |
//! | `wallets` | `customer_id` | `Wallet` | Balance cache |
//! | `wallet_transactions` | `(customer_id, seq)` | `WalletTransaction` | Ledger (append-only) |
//! | `orders` | `order_id` | `OrderRecord` | Orders with nested items |
//! | `order_items_index` | `item_id` | `order_id` | Item-to-order lookup |
//! | `customer_orders` | `(customer_id, order_id)` | `()` | Customer order index |
//! | `seller_orders` | `(seller_id, order_id)` | `()` | Seller order index |
//! | `open_orders` | `order_id` | `()` | Orders with pending items |
//! | `counters` | name | `u64` | Global ledger sequence |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: once `commit()` returns the
//! state is on disk and the file is always in a consistent state. Every
//! mutating engine operation runs inside a single write transaction, which
//! is what makes placement, item transitions and finalization atomic.

use redb::{
    Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition,
    WriteTransaction,
};
use shared::cart::Cart;
use shared::order::OrderRecord;
use shared::product::Product;
use shared::wallet::{Wallet, WalletTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Catalog: key = product_id, value = JSON-serialized Product
const PRODUCTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("products");

/// Carts: key = customer_id, value = JSON-serialized Cart
const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

/// Wallets: key = customer_id, value = JSON-serialized Wallet
const WALLETS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("wallets");

/// Ledger entries: key = (customer_id, seq), value = JSON-serialized WalletTransaction
const WALLET_TX_TABLE: TableDefinition<(&str, u64), &[u8]> =
    TableDefinition::new("wallet_transactions");

/// Orders: key = order_id, value = JSON-serialized OrderRecord
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Item lookup: key = item_id, value = order_id
const ITEM_INDEX_TABLE: TableDefinition<&str, &str> = TableDefinition::new("order_items_index");

/// Customer order index: key = (customer_id, order_id), value = empty
const CUSTOMER_ORDERS_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("customer_orders");

/// Seller order index: key = (seller_id, order_id), value = empty
const SELLER_ORDERS_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("seller_orders");

/// Orders that still have at least one pending item: key = order_id
const OPEN_ORDERS_TABLE: TableDefinition<&str, ()> = TableDefinition::new("open_orders");

/// Counters: key = counter name, value = u64
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const LEDGER_SEQ_KEY: &str = "ledger_seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Marketplace storage backed by redb
#[derive(Clone)]
pub struct MarketStorage {
    db: Arc<Database>,
}

impl MarketStorage {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let storage = Self { db: Arc::new(db) };
        storage.init_tables()?;
        Ok(storage)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(PRODUCTS_TABLE)?;
            let _ = write_txn.open_table(CARTS_TABLE)?;
            let _ = write_txn.open_table(WALLETS_TABLE)?;
            let _ = write_txn.open_table(WALLET_TX_TABLE)?;
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(ITEM_INDEX_TABLE)?;
            let _ = write_txn.open_table(CUSTOMER_ORDERS_TABLE)?;
            let _ = write_txn.open_table(SELLER_ORDERS_TABLE)?;
            let _ = write_txn.open_table(OPEN_ORDERS_TABLE)?;

            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(LEDGER_SEQ_KEY)?.is_none() {
                counters.insert(LEDGER_SEQ_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Products ==========

    /// Store a product (within transaction)
    pub fn store_product(&self, txn: &WriteTransaction, product: &Product) -> StorageResult<()> {
        let mut table = txn.open_table(PRODUCTS_TABLE)?;
        let value = serde_json::to_vec(product)?;
        table.insert(product.id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a product by ID (read-only)
    pub fn get_product(&self, product_id: &str) -> StorageResult<Option<Product>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PRODUCTS_TABLE)?;
        match table.get(product_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a product by ID (within transaction)
    pub fn get_product_txn(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
    ) -> StorageResult<Option<Product>> {
        let table = txn.open_table(PRODUCTS_TABLE)?;
        match table.get(product_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Carts ==========

    /// Store a cart (within transaction)
    pub fn store_cart(&self, txn: &WriteTransaction, cart: &Cart) -> StorageResult<()> {
        let mut table = txn.open_table(CARTS_TABLE)?;
        let value = serde_json::to_vec(cart)?;
        table.insert(cart.customer_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a customer's cart (read-only)
    pub fn get_cart(&self, customer_id: &str) -> StorageResult<Option<Cart>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;
        match table.get(customer_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a customer's cart (within transaction)
    pub fn get_cart_txn(
        &self,
        txn: &WriteTransaction,
        customer_id: &str,
    ) -> StorageResult<Option<Cart>> {
        let table = txn.open_table(CARTS_TABLE)?;
        match table.get(customer_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Wallets ==========

    /// Store a wallet (within transaction)
    pub fn store_wallet(&self, txn: &WriteTransaction, wallet: &Wallet) -> StorageResult<()> {
        let mut table = txn.open_table(WALLETS_TABLE)?;
        let value = serde_json::to_vec(wallet)?;
        table.insert(wallet.customer_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a customer's wallet (read-only)
    pub fn get_wallet(&self, customer_id: &str) -> StorageResult<Option<Wallet>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLETS_TABLE)?;
        match table.get(customer_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get a customer's wallet (within transaction)
    pub fn get_wallet_txn(
        &self,
        txn: &WriteTransaction,
        customer_id: &str,
    ) -> StorageResult<Option<Wallet>> {
        let table = txn.open_table(WALLETS_TABLE)?;
        match table.get(customer_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    // ========== Ledger ==========

    /// Increment and return the global ledger sequence (within transaction)
    pub fn next_ledger_seq(&self, txn: &WriteTransaction) -> StorageResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table
            .get(LEDGER_SEQ_KEY)?
            .map(|guard| guard.value())
            .unwrap_or(0);
        let next = current + 1;
        table.insert(LEDGER_SEQ_KEY, next)?;
        Ok(next)
    }

    /// Append a ledger entry (within transaction). Entries are never
    /// updated or removed.
    pub fn append_wallet_tx(
        &self,
        txn: &WriteTransaction,
        tx: &WalletTransaction,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(WALLET_TX_TABLE)?;
        let key = (tx.customer_id.as_str(), tx.seq);
        let value = serde_json::to_vec(tx)?;
        table.insert(key, value.as_slice())?;
        Ok(())
    }

    /// Get all ledger entries for a customer, ordered by sequence
    pub fn wallet_transactions(&self, customer_id: &str) -> StorageResult<Vec<WalletTransaction>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(WALLET_TX_TABLE)?;

        let mut entries = Vec::new();
        let range_start = (customer_id, 0u64);
        let range_end = (customer_id, u64::MAX);
        for result in table.range(range_start..=range_end)? {
            let (_key, value) = result?;
            let tx: WalletTransaction = serde_json::from_slice(value.value())?;
            entries.push(tx);
        }

        entries.sort_by_key(|t| t.seq);
        Ok(entries)
    }

    // ========== Orders ==========

    /// Store an order record (within transaction)
    pub fn store_order(&self, txn: &WriteTransaction, order: &OrderRecord) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get an order by ID (read-only)
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<OrderRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order by ID (within transaction)
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<OrderRecord>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Record which order an item belongs to (within transaction)
    pub fn index_order_item(
        &self,
        txn: &WriteTransaction,
        item_id: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(ITEM_INDEX_TABLE)?;
        table.insert(item_id, order_id)?;
        Ok(())
    }

    /// Look up the order an item belongs to (within transaction)
    pub fn find_order_for_item_txn(
        &self,
        txn: &WriteTransaction,
        item_id: &str,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(ITEM_INDEX_TABLE)?;
        Ok(table.get(item_id)?.map(|guard| guard.value().to_string()))
    }

    // ========== Order Indexes ==========

    /// Link an order to its customer (within transaction)
    pub fn link_customer_order(
        &self,
        txn: &WriteTransaction,
        customer_id: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(CUSTOMER_ORDERS_TABLE)?;
        table.insert((customer_id, order_id), ())?;
        Ok(())
    }

    /// Link an order to a seller with items in it (within transaction)
    pub fn link_seller_order(
        &self,
        txn: &WriteTransaction,
        seller_id: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SELLER_ORDERS_TABLE)?;
        table.insert((seller_id, order_id), ())?;
        Ok(())
    }

    /// Mark an order as open (has pending items)
    pub fn mark_order_open(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_ORDERS_TABLE)?;
        table.insert(order_id, ())?;
        Ok(())
    }

    /// Remove an order from the open index (all items resolved)
    pub fn mark_order_closed(&self, txn: &WriteTransaction, order_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_ORDERS_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// Get all open order IDs
    pub fn open_order_ids(&self) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(OPEN_ORDERS_TABLE)?;

        let mut order_ids = Vec::new();
        for result in table.iter()? {
            let (key, _value) = result?;
            order_ids.push(key.value().to_string());
        }
        Ok(order_ids)
    }

    /// Get all orders placed by a customer
    pub fn orders_for_customer(&self, customer_id: &str) -> StorageResult<Vec<OrderRecord>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(CUSTOMER_ORDERS_TABLE)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in index.range((customer_id, "")..)? {
            let (key, _) = result?;
            let (cust, order_id) = key.value();
            if cust != customer_id {
                break;
            }
            if let Some(value) = orders_table.get(order_id)? {
                orders.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(orders)
    }

    /// Get all orders containing at least one item of a seller
    pub fn orders_for_seller(&self, seller_id: &str) -> StorageResult<Vec<OrderRecord>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(SELLER_ORDERS_TABLE)?;
        let orders_table = read_txn.open_table(ORDERS_TABLE)?;

        let mut orders = Vec::new();
        for result in index.range((seller_id, "")..)? {
            let (key, _) = result?;
            let (seller, order_id) = key.value();
            if seller != seller_id {
                break;
            }
            if let Some(value) = orders_table.get(order_id)? {
                orders.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(orders)
    }

    // ========== Statistics ==========

    /// Get storage statistics
    pub fn stats(&self) -> StorageResult<StorageStats> {
        let read_txn = self.db.begin_read()?;

        let products = read_txn.open_table(PRODUCTS_TABLE)?;
        let wallets = read_txn.open_table(WALLETS_TABLE)?;
        let wallet_txs = read_txn.open_table(WALLET_TX_TABLE)?;
        let orders = read_txn.open_table(ORDERS_TABLE)?;
        let open_orders = read_txn.open_table(OPEN_ORDERS_TABLE)?;
        let counters = read_txn.open_table(COUNTERS_TABLE)?;

        Ok(StorageStats {
            product_count: products.len()?,
            wallet_count: wallets.len()?,
            wallet_tx_count: wallet_txs.len()?,
            order_count: orders.len()?,
            open_order_count: open_orders.len()?,
            ledger_seq: counters
                .get(LEDGER_SEQ_KEY)?
                .map(|guard| guard.value())
                .unwrap_or(0),
        })
    }
}

/// Storage statistics
#[derive(Debug, Clone)]
pub struct StorageStats {
    pub product_count: u64,
    pub wallet_count: u64,
    pub wallet_tx_count: u64,
    pub order_count: u64,
    pub open_order_count: u64,
    pub ledger_seq: u64,
}
