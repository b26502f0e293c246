use common::OrderId;
use domain::{OrderError, OrderStatus};
use thiserror::Error;

/// Errors that can occur when interacting with the order store.
#[derive(Debug, Error)]
pub enum OrderStoreError {
    /// No order with this id exists.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// An order with this id already exists.
    #[error("Order already exists: {0}")]
    AlreadyExists(OrderId),

    /// The stored status changed since the caller read it.
    #[error("Status conflict for order {id}: expected {expected}, found {actual}")]
    StatusConflict {
        id: OrderId,
        expected: OrderStatus,
        actual: OrderStatus,
    },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored value does not decode into a valid order.
    #[error("Invalid stored order: {0}")]
    Order(#[from] OrderError),
}

/// Result type for order store operations.
pub type Result<T> = std::result::Result<T, OrderStoreError>;
