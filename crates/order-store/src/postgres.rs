use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{
    CustomerRef, Money, Order, OrderItem, OrderParts, OrderStatus, PaymentMethod, Pricing,
};
use sqlx::{
    PgConnection, PgPool, Row,
    postgres::{PgPoolOptions, PgRow},
};
use uuid::Uuid;

use crate::{
    OrderStoreError, Result,
    store::{OrderStore, UpdateOptions},
};

const ORDER_COLUMNS: &str = r#"
    o.id::text AS id,
    o.status,
    o.customer_id::text AS customer_id,
    c.name AS customer_name,
    c.phone AS customer_phone,
    o.subtotal::text AS subtotal,
    o.delivery_fee::text AS delivery_fee,
    o.discount::text AS discount,
    o.total::text AS total,
    o.payment_method,
    o.delivery_address,
    o.notes,
    o.created_at
"#;

/// PostgreSQL-backed order store implementation.
///
/// Money columns are `NUMERIC(10, 2)`. They are read back as decimal text
/// and written as integer centavos; nothing passes through a float.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` with a small pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn load_items(
        conn: &mut PgConnection,
        order_ids: &[Uuid],
    ) -> Result<HashMap<String, Vec<OrderItem>>> {
        let mut items: HashMap<String, Vec<OrderItem>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(items);
        }

        let rows = sqlx::query(
            r#"
            SELECT order_id::text AS order_id, product_id, product_name, quantity,
                   unit_price::text AS unit_price
            FROM order_items
            WHERE order_id = ANY($1)
            ORDER BY order_id, position ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(&mut *conn)
        .await?;

        for row in rows {
            let order_id: String = row.try_get("order_id")?;
            items.entry(order_id).or_default().push(Self::row_to_item(&row)?);
        }
        Ok(items)
    }

    fn row_to_item(row: &PgRow) -> Result<OrderItem> {
        let quantity: i32 = row.try_get("quantity")?;
        let quantity = u32::try_from(quantity).map_err(|_| {
            sqlx::Error::Decode(format!("negative item quantity {quantity}").into())
        })?;

        let mut item = OrderItem::new(
            row.try_get::<String, _>("product_name")?,
            quantity,
            money_column(row, "unit_price")?,
        );
        if let Some(product_id) = row.try_get::<Option<String>, _>("product_id")? {
            item = item.with_product(product_id);
        }
        Ok(item)
    }

    fn row_to_order(row: &PgRow, items: Vec<OrderItem>) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let payment_method: Option<String> = row.try_get("payment_method")?;

        let customer = match row.try_get::<Option<String>, _>("customer_id")? {
            Some(id) => Some(CustomerRef {
                id: id.into(),
                name: row
                    .try_get::<Option<String>, _>("customer_name")?
                    .unwrap_or_default(),
                phone: row.try_get("customer_phone")?,
            }),
            None => None,
        };

        Ok(Order::from_parts(OrderParts {
            id: OrderId::from(row.try_get::<String, _>("id")?),
            status: status.parse()?,
            customer,
            items,
            pricing: Pricing {
                subtotal: money_column(row, "subtotal")?,
                delivery_fee: money_column(row, "delivery_fee")?,
                discount: money_column(row, "discount")?,
            },
            total: money_column(row, "total")?,
            payment_method: payment_method
                .map(|m| m.parse::<PaymentMethod>())
                .transpose()?,
            delivery_address: row.try_get("delivery_address")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        }))
    }

    async fn fetch_order(conn: &mut PgConnection, id: &OrderId, uuid: Uuid) -> Result<Order> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            LEFT JOIN customers c ON c.id = o.customer_id
            WHERE o.id = $1
            "#
        ))
        .bind(uuid)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| OrderStoreError::NotFound(id.clone()))?;

        let items = Self::load_items(conn, &[uuid])
            .await?
            .remove(&row.try_get::<String, _>("id")?)
            .unwrap_or_default();
        Self::row_to_order(&row, items)
    }

    async fn current_status(&self, id: Uuid) -> Result<Option<OrderStatus>> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(status.map(|s| s.parse()).transpose()?)
    }
}

/// Reads a `NUMERIC` column rendered as text.
fn money_column(row: &PgRow, column: &str) -> Result<Money> {
    let raw: String = row.try_get(column)?;
    Ok(Money::from_decimal_str(&raw)?)
}

/// Ids that are not UUIDs cannot exist in the table.
fn parse_order_id(id: &OrderId) -> Result<Uuid> {
    Uuid::parse_str(id.as_str()).map_err(|_| OrderStoreError::NotFound(id.clone()))
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn list_orders(&self) -> Result<Vec<Order>> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders o
            LEFT JOIN customers c ON c.id = o.customer_id
            ORDER BY o.created_at DESC, o.id ASC
            "#
        ))
        .fetch_all(&mut *conn)
        .await?;

        let ids = rows
            .iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                parse_order_id(&OrderId::from(id))
            })
            .collect::<Result<Vec<_>>>()?;
        let mut items = Self::load_items(&mut conn, &ids).await?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let order_items = items.remove(&id).unwrap_or_default();
                Self::row_to_order(row, order_items)
            })
            .collect()
    }

    async fn get_order(&self, id: &OrderId) -> Result<Order> {
        let uuid = parse_order_id(id)?;
        let mut conn = self.pool.acquire().await?;
        Self::fetch_order(&mut conn, id, uuid).await
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        new_status: OrderStatus,
        options: UpdateOptions,
    ) -> Result<Order> {
        let uuid = parse_order_id(id)?;

        // The updated row stays locked until commit, so the order read back
        // carries the status written here.
        let mut tx = self.pool.begin().await?;
        let updated = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1 AND ($3::text IS NULL OR status = $3)
            RETURNING id
            "#,
        )
        .bind(uuid)
        .bind(new_status.as_str())
        .bind(options.expected_status.map(|s| s.as_str()))
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            tx.rollback().await?;
            let Some(expected) = options.expected_status else {
                return Err(OrderStoreError::NotFound(id.clone()));
            };
            let actual = self
                .current_status(uuid)
                .await?
                .ok_or_else(|| OrderStoreError::NotFound(id.clone()))?;
            tracing::debug!(%id, %expected, %actual, "conditional status update rejected");
            return Err(OrderStoreError::StatusConflict {
                id: id.clone(),
                expected,
                actual,
            });
        }

        let order = Self::fetch_order(&mut tx, id, uuid).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn insert_order(&self, order: Order) -> Result<()> {
        let uuid = Uuid::parse_str(order.id().as_str()).map_err(|_| {
            sqlx::Error::Encode(format!("order id {} is not a UUID", order.id()).into())
        })?;

        let mut tx = self.pool.begin().await?;

        if let Some(customer) = order.customer() {
            sqlx::query(
                r#"
                INSERT INTO customers (id, name, phone)
                VALUES ($1::uuid, $2, $3)
                ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, phone = EXCLUDED.phone
                "#,
            )
            .bind(customer.id.as_str())
            .bind(&customer.name)
            .bind(&customer.phone)
            .execute(&mut *tx)
            .await?;
        }

        let pricing = order.pricing();
        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_id, status, subtotal, delivery_fee, discount, total,
                                payment_method, delivery_address, notes, created_at, updated_at)
            VALUES ($1, $2::uuid, $3, $4::numeric / 100, $5::numeric / 100, $6::numeric / 100,
                    $7::numeric / 100, $8, $9, $10, $11, $11)
            "#,
        )
        .bind(uuid)
        .bind(order.customer().map(|c| c.id.as_str()))
        .bind(order.status().as_str())
        .bind(pricing.subtotal.cents())
        .bind(pricing.delivery_fee.cents())
        .bind(pricing.discount.cents())
        .bind(order.total().cents())
        .bind(order.payment_method().map(|m| m.as_str()))
        .bind(order.delivery_address())
        .bind(order.notes())
        .bind(order.created_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_pkey")
            {
                return OrderStoreError::AlreadyExists(order.id().clone());
            }
            OrderStoreError::Database(e)
        })?;

        for (position, item) in order.items().iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                sqlx::Error::Encode(format!("item position {position} out of range").into())
            })?;
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                sqlx::Error::Encode(format!("item quantity {} out of range", item.quantity).into())
            })?;

            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, product_name, quantity,
                                         unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5, $6::numeric / 100, $7::numeric / 100)
                "#,
            )
            .bind(uuid)
            .bind(position)
            .bind(item.product_id.as_ref().map(|p| p.as_str()))
            .bind(&item.product_name)
            .bind(quantity)
            .bind(item.unit_price.cents())
            .bind(item.total_price().cents())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        tracing::debug!(id = %order.id(), status = %order.status(), "order inserted");
        Ok(())
    }
}
