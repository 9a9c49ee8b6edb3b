//! Money calculation utilities using rust_decimal for precision
//!
//! Prices and amounts are stored as `f64` in serialized rows; every
//! calculation runs on `Decimal` and is converted back with 2-decimal
//! half-up rounding.

use crate::engine::error::EngineError;
use rust_decimal::prelude::*;
use shared::order::OrderItem;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed product price
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per order line
const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed single wallet mutation
const MAX_AMOUNT: f64 = 1_000_000.0;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), EngineError> {
    if !value.is_finite() {
        return Err(EngineError::InvalidOperation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a product price before storing or snapshotting it
pub fn validate_price(price: f64) -> Result<(), EngineError> {
    require_finite(price, "price")?;
    if price < 0.0 {
        return Err(EngineError::InvalidOperation(format!(
            "price must be non-negative, got {}",
            price
        )));
    }
    if price > MAX_PRICE {
        return Err(EngineError::InvalidOperation(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Validate a purchase quantity
pub fn validate_quantity(quantity: i32) -> Result<(), EngineError> {
    if quantity <= 0 {
        return Err(EngineError::InvalidOperation(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(EngineError::InvalidOperation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

/// Validate a wallet mutation amount (deposit, debit or credit)
pub fn validate_amount(amount: f64) -> Result<(), EngineError> {
    require_finite(amount, "amount")?;
    if amount <= 0.0 {
        return Err(EngineError::InvalidOperation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(EngineError::InvalidOperation(format!(
            "amount exceeds maximum allowed ({}), got {}",
            MAX_AMOUNT, amount
        )));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Line total for an order item: `price_at_purchase * quantity`.
/// This is also the exact refund amount if the line is rejected.
pub fn line_total(item: &OrderItem) -> Decimal {
    (to_decimal(item.price_at_purchase) * Decimal::from(item.quantity))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Order total: sum of line totals
pub fn order_total(items: &[OrderItem]) -> Decimal {
    items.iter().map(line_total).sum()
}

/// Check if a balance covers a required amount. Strict: allowing even a
/// tolerance-sized shortfall here would let a debit drive the balance
/// negative.
pub fn covers(balance: f64, required: f64) -> bool {
    to_decimal(balance) >= to_decimal(required)
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}
