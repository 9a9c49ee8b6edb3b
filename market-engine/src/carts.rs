//! Cart operations (the cart-provider seam)

use crate::engine::error::{EngineError, EngineResult};
use crate::money;
use crate::storage::MarketStorage;
use redb::WriteTransaction;
use shared::cart::Cart;

/// Add quantity of a product to a customer's cart, creating the cart on
/// first use. The product must exist and be active.
pub fn add_to_cart(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    customer_id: &str,
    product_id: &str,
    quantity: i32,
) -> EngineResult<Cart> {
    money::validate_quantity(quantity)?;
    let product = storage
        .get_product_txn(txn, product_id)?
        .ok_or_else(|| EngineError::ProductNotFound(product_id.to_string()))?;
    if !product.is_active {
        return Err(EngineError::ProductInactive(product_id.to_string()));
    }

    let mut cart = storage
        .get_cart_txn(txn, customer_id)?
        .unwrap_or_else(|| Cart::new(customer_id));
    cart.add_item(product_id, quantity);
    storage.store_cart(txn, &cart)?;
    Ok(cart)
}

/// Remove a product line from a customer's cart
pub fn remove_from_cart(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    customer_id: &str,
    product_id: &str,
) -> EngineResult<Cart> {
    let mut cart = storage
        .get_cart_txn(txn, customer_id)?
        .unwrap_or_else(|| Cart::new(customer_id));
    cart.remove_item(product_id);
    storage.store_cart(txn, &cart)?;
    Ok(cart)
}

/// Empty a customer's cart (the cart row itself is retained)
pub fn clear_cart(
    storage: &MarketStorage,
    txn: &WriteTransaction,
    customer_id: &str,
) -> EngineResult<Cart> {
    let mut cart = storage
        .get_cart_txn(txn, customer_id)?
        .unwrap_or_else(|| Cart::new(customer_id));
    cart.items.clear();
    storage.store_cart(txn, &cart)?;
    Ok(cart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::product::Product;

    fn seed_product(storage: &MarketStorage, id: &str, active: bool) {
        let txn = storage.begin_write().unwrap();
        storage
            .store_product(
                &txn,
                &Product {
                    id: id.to_string(),
                    name: "Widget".to_string(),
                    price: 5.0,
                    stock_quantity: 10,
                    seller_id: "seller-1".to_string(),
                    is_active: active,
                },
            )
            .unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn test_add_to_cart_creates_and_merges() {
        let storage = MarketStorage::open_in_memory().unwrap();
        seed_product(&storage, "p1", true);

        let txn = storage.begin_write().unwrap();
        add_to_cart(&storage, &txn, "cust-1", "p1", 2).unwrap();
        let cart = add_to_cart(&storage, &txn, "cust-1", "p1", 1).unwrap();
        txn.commit().unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 3);
    }

    #[test]
    fn test_add_inactive_product_rejected() {
        let storage = MarketStorage::open_in_memory().unwrap();
        seed_product(&storage, "p1", false);

        let txn = storage.begin_write().unwrap();
        let result = add_to_cart(&storage, &txn, "cust-1", "p1", 1);
        assert!(matches!(result, Err(EngineError::ProductInactive(_))));
        drop(txn);
    }

    #[test]
    fn test_add_unknown_product_rejected() {
        let storage = MarketStorage::open_in_memory().unwrap();

        let txn = storage.begin_write().unwrap();
        let result = add_to_cart(&storage, &txn, "cust-1", "ghost", 1);
        assert!(matches!(result, Err(EngineError::ProductNotFound(_))));
        drop(txn);
    }

    #[test]
    fn test_remove_and_clear() {
        let storage = MarketStorage::open_in_memory().unwrap();
        seed_product(&storage, "p1", true);
        seed_product(&storage, "p2", true);

        let txn = storage.begin_write().unwrap();
        add_to_cart(&storage, &txn, "cust-1", "p1", 1).unwrap();
        add_to_cart(&storage, &txn, "cust-1", "p2", 2).unwrap();
        let cart = remove_from_cart(&storage, &txn, "cust-1", "p1").unwrap();
        assert_eq!(cart.items.len(), 1);
        let cart = clear_cart(&storage, &txn, "cust-1").unwrap();
        assert!(cart.is_empty());
        txn.commit().unwrap();

        // Cart row survives being emptied
        assert!(storage.get_cart("cust-1").unwrap().is_some());
    }
}
