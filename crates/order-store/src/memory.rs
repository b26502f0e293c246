use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use domain::{Order, OrderStatus};
use tokio::sync::RwLock;

use crate::{
    OrderStoreError, Result,
    store::{OrderStore, UpdateOptions},
};

/// In-memory order store implementation for testing.
///
/// This implementation keeps all orders in memory and provides
/// the same interface as the PostgreSQL implementation.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `orders`.
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let orders = orders
            .into_iter()
            .map(|order| (order.id().clone(), order))
            .collect();
        Self {
            orders: Arc::new(RwLock::new(orders)),
        }
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Removes every order.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn list_orders(&self) -> Result<Vec<Order>> {
        let store = self.orders.read().await;
        let mut orders: Vec<_> = store.values().cloned().collect();
        orders.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(orders)
    }

    async fn get_order(&self, id: &OrderId) -> Result<Order> {
        self.orders
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| OrderStoreError::NotFound(id.clone()))
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        new_status: OrderStatus,
        options: UpdateOptions,
    ) -> Result<Order> {
        let mut store = self.orders.write().await;
        let stored = store
            .get_mut(id)
            .ok_or_else(|| OrderStoreError::NotFound(id.clone()))?;

        if let Some(expected) = options.expected_status
            && stored.status() != expected
        {
            return Err(OrderStoreError::StatusConflict {
                id: id.clone(),
                expected,
                actual: stored.status(),
            });
        }

        let mut parts = stored.clone().into_parts();
        parts.status = new_status;
        *stored = Order::from_parts(parts);

        Ok(stored.clone())
    }

    async fn insert_order(&self, order: Order) -> Result<()> {
        let mut store = self.orders.write().await;
        if store.contains_key(order.id()) {
            return Err(OrderStoreError::AlreadyExists(order.id().clone()));
        }
        store.insert(order.id().clone(), order);
        Ok(())
    }
}
