//! Product catalog operations (the product-provider seam)
//!
//! Stock mutations are single read-modify-writes inside the caller's write
//! transaction, which is what prevents two concurrent placements from both
//! passing the stock check and both decrementing.

use crate::engine::error::{EngineError, EngineResult};
use crate::money;
use crate::storage::MarketStorage;
use redb::WriteTransaction;
use shared::product::Product;

/// Create or replace a product listing
pub fn upsert_product(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    product: &Product,
) -> EngineResult<()> {
    money::validate_price(product.price)?;
    if product.stock_quantity < 0 {
        return Err(EngineError::InvalidOperation(format!(
            "stock_quantity must be non-negative, got {}",
            product.stock_quantity
        )));
    }
    storage.store_product(txn, product)?;
    Ok(())
}

/// Reserve stock for a purchase: decrement if sufficient, error otherwise.
/// Returns the updated product.
pub fn decrement_stock(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    product_id: &str,
    quantity: i32,
) -> EngineResult<Product> {
    money::validate_quantity(quantity)?;
    let mut product = storage
        .get_product_txn(txn, product_id)?
        .ok_or_else(|| EngineError::ProductNotFound(product_id.to_string()))?;

    if product.stock_quantity < quantity {
        return Err(EngineError::InsufficientStock(product_id.to_string()));
    }

    product.stock_quantity -= quantity;
    storage.store_product(txn, &product)?;
    Ok(product)
}

/// Release a reservation back to saleable inventory (item rejected or order
/// cancelled). A product removed or delisted since placement is logged and
/// skipped: the refund must not fail because the listing is gone.
pub fn restore_stock(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    product_id: &str,
    quantity: i32,
) -> EngineResult<()> {
    match storage.get_product_txn(txn, product_id)? {
        Some(mut product) => {
            product.stock_quantity += quantity;
            storage.store_product(txn, &product)?;
        }
        None => {
            tracing::warn!(
                product_id = %product_id,
                quantity = quantity,
                "Cannot restore stock, product no longer exists"
            );
        }
    }
    Ok(())
}

/// Adjust stock by a signed delta (restock or manual correction). The
/// resulting quantity must not go negative.
pub fn adjust_stock(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    product_id: &str,
    delta: i32,
) -> EngineResult<Product> {
    let mut product = storage
        .get_product_txn(txn, product_id)?
        .ok_or_else(|| EngineError::ProductNotFound(product_id.to_string()))?;

    let new_quantity = product.stock_quantity + delta;
    if new_quantity < 0 {
        return Err(EngineError::InvalidOperation(format!(
            "stock adjustment would make quantity negative: {} + {}",
            product.stock_quantity, delta
        )));
    }

    product.stock_quantity = new_quantity;
    storage.store_product(txn, &product)?;
    Ok(product)
}
