//! Product catalog types

use serde::{Deserialize, Serialize};

/// A product listed by one seller.
///
/// `price` is the current list price; orders snapshot it per item at
/// placement time, so later price changes never affect placed orders.
/// `stock_quantity` is saleable inventory and must never go negative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Product ID
    pub id: String,
    /// Display name (snapshotted onto order items for audit)
    pub name: String,
    /// Current list price
    pub price: f64,
    /// Saleable stock
    pub stock_quantity: i32,
    /// Owning seller
    pub seller_id: String,
    /// Inactive products cannot be added to carts or purchased
    pub is_active: bool,
}
