use async_trait::async_trait;
use common::OrderId;
use domain::{Order, OrderStatus};

use crate::Result;

/// Options for a status update.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Status the order must still be in for the write to happen.
    /// If None, the write is unconditional (last write wins).
    pub expected_status: Option<OrderStatus>,
}

impl UpdateOptions {
    /// Creates options with no status check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options expecting the order to still be in `status`.
    pub fn expect_status(status: OrderStatus) -> Self {
        Self {
            expected_status: Some(status),
        }
    }
}

/// Persistence contract for orders.
///
/// Stores do not enforce the status workflow; callers validate transitions
/// with the engine before writing. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Lists every order, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// Loads one order.
    ///
    /// Fails with `NotFound` if the id is unknown.
    async fn get_order(&self, id: &OrderId) -> Result<Order>;

    /// Writes a new status and returns the stored order.
    ///
    /// If `options.expected_status` is set and the stored status differs,
    /// fails with `StatusConflict` and writes nothing.
    async fn update_order_status(
        &self,
        id: &OrderId,
        new_status: OrderStatus,
        options: UpdateOptions,
    ) -> Result<Order>;

    /// Stores a newly placed order.
    ///
    /// Fails with `AlreadyExists` if the id is taken.
    async fn insert_order(&self, order: Order) -> Result<()>;
}
