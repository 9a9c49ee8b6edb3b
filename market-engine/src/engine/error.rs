use crate::storage::StorageError;
use shared::order::{OpError, OpErrorCode};
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order item not found: {0}")]
    ItemNotFound(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Product is not active: {0}")]
    ProductInactive(String),

    #[error("No wallet for customer: {0}")]
    WalletNotFound(String),

    #[error("Cart is empty for customer: {0}")]
    EmptyCart(String),

    #[error("Insufficient stock for product: {0}")]
    InsufficientStock(String),

    #[error("Insufficient funds: required {required:.2}, available {available:.2}")]
    InsufficientFunds { required: f64, available: f64 },

    #[error("Item already processed: {0}")]
    AlreadyProcessed(String),

    #[error("Acting seller does not own item: {0}")]
    NotItemOwner(String),

    #[error("Acting customer does not own order: {0}")]
    NotOrderOwner(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Classify a storage error into a wire error code (callers localize)
fn classify_storage_error(e: &StorageError) -> OpErrorCode {
    if let StorageError::Serialization(_) = e {
        return OpErrorCode::InternalError;
    }

    // redb errors are classified by message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return OpErrorCode::StorageFull;
    }

    if err_str.contains("out of memory") || err_str.contains("cannot allocate") {
        return OpErrorCode::OutOfMemory;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return OpErrorCode::StorageCorrupted;
    }

    OpErrorCode::SystemBusy
}

impl From<EngineError> for OpError {
    fn from(err: EngineError) -> Self {
        let (code, message) = match err {
            EngineError::Storage(e) => {
                let code = classify_storage_error(&e);
                let message = e.to_string();
                tracing::error!(error = %e, error_code = ?code, "Storage error occurred");
                (code, message)
            }
            EngineError::OrderNotFound(id) => (
                OpErrorCode::OrderNotFound,
                format!("Order not found: {}", id),
            ),
            EngineError::ItemNotFound(id) => (
                OpErrorCode::ItemNotFound,
                format!("Order item not found: {}", id),
            ),
            EngineError::ProductNotFound(id) => (
                OpErrorCode::ProductNotFound,
                format!("Product not found: {}", id),
            ),
            EngineError::ProductInactive(id) => (
                OpErrorCode::ProductInactive,
                format!("Product is not active: {}", id),
            ),
            EngineError::WalletNotFound(id) => (
                OpErrorCode::WalletNotFound,
                format!("No wallet for customer: {}", id),
            ),
            EngineError::EmptyCart(id) => (
                OpErrorCode::EmptyCart,
                format!("Cart is empty for customer: {}", id),
            ),
            EngineError::InsufficientStock(id) => (
                OpErrorCode::InsufficientStock,
                format!("Insufficient stock for product: {}", id),
            ),
            EngineError::InsufficientFunds {
                required,
                available,
            } => (
                OpErrorCode::InsufficientFunds,
                format!(
                    "Insufficient funds: required {:.2}, available {:.2}",
                    required, available
                ),
            ),
            EngineError::AlreadyProcessed(id) => (
                OpErrorCode::AlreadyProcessed,
                format!("Item already processed: {}", id),
            ),
            EngineError::NotItemOwner(id) => (
                OpErrorCode::NotItemOwner,
                format!("Acting seller does not own item: {}", id),
            ),
            EngineError::NotOrderOwner(id) => (
                OpErrorCode::NotOrderOwner,
                format!("Acting customer does not own order: {}", id),
            ),
            EngineError::InvalidOperation(msg) => (OpErrorCode::InvalidOperation, msg),
        };
        OpError::new(code, message)
    }
}
