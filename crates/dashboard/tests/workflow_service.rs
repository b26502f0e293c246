//! Integration tests for the workflow service over a shared store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{FixedOffset, TimeZone, Utc};
use dashboard::{OrderWorkflowService, WorkflowError};
use domain::{
    Clock, FixedClock, Money, Order, OrderId, OrderStatus, Pricing, StatusFilter, SystemClock,
};
use order_store::{InMemoryOrderStore, OrderStore, OrderStoreError, UpdateOptions};

fn fixed_clock(hour: u32) -> Arc<dyn Clock> {
    let now = FixedOffset::west_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 15, hour, 0, 0)
        .unwrap();
    Arc::new(FixedClock::new(now))
}

fn placed(id: &str, cents: i64) -> Order {
    Order::new(
        id,
        Pricing::subtotal(Money::from_cents(cents)),
        Utc.with_ymd_and_hms(2024, 3, 15, 14, 0, 0).unwrap(),
    )
}

/// A store whose reads lag one write behind, as when another operator
/// changed the order after this one loaded it.
struct LaggingStore {
    inner: InMemoryOrderStore,
    stale: Order,
}

#[async_trait]
impl OrderStore for LaggingStore {
    async fn list_orders(&self) -> order_store::Result<Vec<Order>> {
        self.inner.list_orders().await
    }

    async fn get_order(&self, _id: &OrderId) -> order_store::Result<Order> {
        Ok(self.stale.clone())
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        new_status: OrderStatus,
        options: UpdateOptions,
    ) -> order_store::Result<Order> {
        self.inner.update_order_status(id, new_status, options).await
    }

    async fn insert_order(&self, order: Order) -> order_store::Result<()> {
        self.inner.insert_order(order).await
    }
}

#[tokio::test]
async fn concurrent_change_is_detected_on_write() {
    let inner = InMemoryOrderStore::with_orders([placed("o-1", 1500)]);
    let id = OrderId::from("o-1");

    // Another operator cancels the order.
    let other = OrderWorkflowService::new(inner.clone(), fixed_clock(18));
    other.cancel_order(&id).await.unwrap();

    // This operator still sees it as pending and tries to confirm it.
    let store = LaggingStore {
        inner: inner.clone(),
        stale: placed("o-1", 1500),
    };
    let service = OrderWorkflowService::new(store, fixed_clock(18));
    let result = service.advance_order(&id).await;

    assert!(matches!(
        result,
        Err(WorkflowError::Store(OrderStoreError::StatusConflict {
            expected: OrderStatus::Pending,
            actual: OrderStatus::Cancelled,
            ..
        }))
    ));
    assert_eq!(
        inner.get_order(&id).await.unwrap().status(),
        OrderStatus::Cancelled
    );
}

#[tokio::test]
async fn services_sharing_a_store_see_each_other() {
    let store = InMemoryOrderStore::new();
    store.insert_order(placed("o-1", 1000)).await.unwrap();
    store.insert_order(placed("o-2", 2500)).await.unwrap();

    let kitchen = OrderWorkflowService::new(store.clone(), fixed_clock(18));
    let counter = OrderWorkflowService::new(store.clone(), fixed_clock(18));

    let id = OrderId::from("o-2");
    kitchen.advance_order(&id).await.unwrap();
    counter.advance_order(&id).await.unwrap();
    kitchen.advance_order(&id).await.unwrap();
    counter.advance_order(&id).await.unwrap();

    let delivered = counter
        .list_orders(StatusFilter::Only(OrderStatus::Delivered))
        .await
        .unwrap();
    assert_eq!(delivered.len(), 1);

    let overview = kitchen.overview().await.unwrap();
    assert_eq!(overview.delivered_today, 1);
    assert_eq!(overview.today_revenue, Money::from_cents(2500));
    assert_eq!(overview.pending, 1);
}

#[tokio::test]
async fn day_boundary_moves_with_the_clock_zone() {
    // Delivered order placed at 01:00 UTC on the 16th.
    let order = Order::new(
        "late",
        Pricing::subtotal(Money::from_cents(3000)),
        Utc.with_ymd_and_hms(2024, 3, 16, 1, 0, 0).unwrap(),
    );
    let store = InMemoryOrderStore::with_orders([order]);
    let id = OrderId::from("late");

    let local = OrderWorkflowService::new(store.clone(), fixed_clock(23));
    for _ in 0..4 {
        local.advance_order(&id).await.unwrap();
    }

    // 22:00 on the 15th in UTC-03:00 is the same local day.
    assert_eq!(local.overview().await.unwrap().delivered_today, 1);

    // A UTC dashboard looking at the 15th does not count it.
    let utc_evening = Utc
        .with_ymd_and_hms(2024, 3, 15, 22, 0, 0)
        .unwrap()
        .fixed_offset();
    let utc = OrderWorkflowService::new(store, Arc::new(FixedClock::new(utc_evening)));
    assert_eq!(utc.overview().await.unwrap().delivered_today, 0);
}

#[tokio::test]
async fn system_clock_overview_counts_everything() {
    let store = InMemoryOrderStore::with_orders([placed("a", 100), placed("b", 200)]);
    let service = OrderWorkflowService::new(store, Arc::new(SystemClock::utc()));

    let overview = service.overview().await.unwrap();
    assert_eq!(overview.total_orders, 2);
    assert_eq!(overview.pending, 2);
}
