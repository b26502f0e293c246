//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p order-store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use domain::{
    CustomerId, CustomerRef, Money, Order, OrderId, OrderItem, OrderStatus, PaymentMethod, Pricing,
    apply_transition,
};
use order_store::{OrderStore, OrderStoreError, PostgresOrderStore, UpdateOptions};
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PostgresOrderStore::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresOrderStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE order_items, orders, customers")
        .execute(&pool)
        .await
        .unwrap();

    PostgresOrderStore::new(pool)
}

fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 18, 45, 0).unwrap()
}

fn full_order() -> Order {
    let pricing = Pricing::subtotal(Money::from_cents(5980))
        .with_delivery_fee(Money::from_cents(700))
        .with_discount(Money::from_cents(500));

    Order::new(OrderId::new(), pricing, created_at())
        .with_customer(
            CustomerRef::new(CustomerId::new(), "Carla Mendes")
                .with_phone("+55 21 97777-1234"),
        )
        .with_items(vec![
            OrderItem::new("Pizza Calabresa", 2, Money::from_cents(2490)).with_product("p-10"),
            OrderItem::new("Guarana 2L", 1, Money::from_cents(1000)),
        ])
        .with_payment_method(PaymentMethod::CreditCard)
        .with_delivery_address("Av. Atlantica, 1702")
        .with_notes("interfone quebrado")
}

#[tokio::test]
async fn insert_and_get_round_trips_every_field() {
    let store = get_test_store().await;
    let order = full_order();

    store.insert_order(order.clone()).await.unwrap();
    let loaded = store.get_order(order.id()).await.unwrap();

    assert_eq!(loaded, order);
    assert_eq!(loaded.total(), Money::from_cents(6180));
    assert_eq!(loaded.items()[0].product_name, "Pizza Calabresa");
}

#[tokio::test]
async fn order_without_customer() {
    let store = get_test_store().await;
    let order = Order::new(
        OrderId::new(),
        Pricing::subtotal(Money::from_cents(1050)),
        created_at(),
    );

    store.insert_order(order.clone()).await.unwrap();
    let loaded = store.get_order(order.id()).await.unwrap();

    assert!(loaded.customer().is_none());
    assert_eq!(loaded.customer_name(), "Cliente nao identificado");
    assert!(loaded.items().is_empty());
}

#[tokio::test]
async fn duplicate_insert_is_rejected() {
    let store = get_test_store().await;
    let order = full_order();

    store.insert_order(order.clone()).await.unwrap();
    let result = store.insert_order(order).await;

    assert!(matches!(result, Err(OrderStoreError::AlreadyExists(_))));
}

#[tokio::test]
async fn list_is_newest_first() {
    let store = get_test_store().await;

    let mut ids = Vec::new();
    for minutes in [30, 0, 90] {
        let order = Order::new(
            OrderId::new(),
            Pricing::subtotal(Money::from_cents(100)),
            created_at() - Duration::minutes(minutes),
        );
        ids.push((minutes, order.id().clone()));
        store.insert_order(order).await.unwrap();
    }
    ids.sort_by_key(|(minutes, _)| *minutes);

    let listed: Vec<OrderId> = store
        .list_orders()
        .await
        .unwrap()
        .iter()
        .map(|o| o.id().clone())
        .collect();
    let expected: Vec<OrderId> = ids.into_iter().map(|(_, id)| id).collect();
    assert_eq!(listed, expected);
}

#[tokio::test]
async fn missing_and_malformed_ids_are_not_found() {
    let store = get_test_store().await;

    let missing = store.get_order(&OrderId::new()).await;
    assert!(matches!(missing, Err(OrderStoreError::NotFound(_))));

    let malformed = store.get_order(&OrderId::from("not-a-uuid")).await;
    assert!(matches!(malformed, Err(OrderStoreError::NotFound(_))));
}

#[tokio::test]
async fn conditional_status_update() {
    let store = get_test_store().await;
    let order = full_order();
    store.insert_order(order.clone()).await.unwrap();

    let confirmed = apply_transition(&order, OrderStatus::Confirmed).unwrap();
    let stored = store
        .update_order_status(
            order.id(),
            confirmed.status(),
            UpdateOptions::expect_status(OrderStatus::Pending),
        )
        .await
        .unwrap();
    assert_eq!(stored, confirmed);

    // A second writer still holding the pending copy loses.
    let stale = store
        .update_order_status(
            order.id(),
            OrderStatus::Cancelled,
            UpdateOptions::expect_status(OrderStatus::Pending),
        )
        .await;
    assert!(matches!(
        stale,
        Err(OrderStoreError::StatusConflict {
            expected: OrderStatus::Pending,
            actual: OrderStatus::Confirmed,
            ..
        })
    ));
}

#[tokio::test]
async fn update_missing_order_is_not_found() {
    let store = get_test_store().await;
    let result = store
        .update_order_status(&OrderId::new(), OrderStatus::Cancelled, UpdateOptions::new())
        .await;
    assert!(matches!(result, Err(OrderStoreError::NotFound(_))));

    let conditional = store
        .update_order_status(
            &OrderId::new(),
            OrderStatus::Confirmed,
            UpdateOptions::expect_status(OrderStatus::Pending),
        )
        .await;
    assert!(matches!(conditional, Err(OrderStoreError::NotFound(_))));
}

#[tokio::test]
async fn concurrent_updates_return_their_own_write() {
    let store = get_test_store().await;
    let order = full_order();
    store.insert_order(order.clone()).await.unwrap();

    let writer = |store: PostgresOrderStore, id: OrderId, status: OrderStatus| async move {
        for _ in 0..25 {
            let stored = store
                .update_order_status(&id, status, UpdateOptions::new())
                .await
                .unwrap();
            assert_eq!(stored.status(), status);
            assert_eq!(stored.items().len(), 2);
        }
    };

    tokio::join!(
        writer(store.clone(), order.id().clone(), OrderStatus::Preparing),
        writer(store.clone(), order.id().clone(), OrderStatus::Delivering),
    );
}

#[tokio::test]
async fn fractional_amounts_are_read_exactly() {
    let store = get_test_store().await;
    let order = full_order();
    store.insert_order(order.clone()).await.unwrap();

    sqlx::query(
        "UPDATE orders SET subtotal = 12.5, delivery_fee = 0.07, total = 12.57 WHERE id = $1::uuid",
    )
    .bind(order.id().as_str())
    .execute(store.pool())
    .await
    .unwrap();

    let loaded = store.get_order(order.id()).await.unwrap();
    assert_eq!(loaded.pricing().subtotal, Money::from_cents(1250));
    assert_eq!(loaded.pricing().delivery_fee, Money::from_cents(7));
    assert_eq!(loaded.total(), Money::from_cents(1257));
    assert_eq!(loaded.items()[1].unit_price, Money::from_cents(1000));
}

#[tokio::test]
async fn unknown_stored_status_surfaces_as_error() {
    let store = get_test_store().await;
    let order = full_order();
    store.insert_order(order.clone()).await.unwrap();

    sqlx::query("UPDATE orders SET status = 'lost_in_transit' WHERE id = $1::uuid")
        .bind(order.id().as_str())
        .execute(store.pool())
        .await
        .unwrap();

    let result = store.get_order(order.id()).await;
    assert!(matches!(
        result,
        Err(OrderStoreError::Order(domain::OrderError::UnknownStatus(ref s))) if s == "lost_in_transit"
    ));
}
