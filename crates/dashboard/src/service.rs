//! Order workflow service providing a simplified API for status changes.

use std::sync::Arc;

use chrono::FixedOffset;
use common::OrderId;
use domain::{
    Clock, Order, OrderError, OrderStatus, StatusFilter, apply_transition, filter_by_status,
    next_status, summarize,
};
use order_store::{OrderStore, UpdateOptions};

use crate::{DashboardOverview, Result};

/// Service for driving orders through the status workflow.
///
/// Every change is validated against the order as it is stored right now,
/// then written back on the condition that nobody moved it in between.
pub struct OrderWorkflowService<S: OrderStore> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: OrderStore> OrderWorkflowService<S> {
    /// Creates a new workflow service over `store`, reading "now" from `clock`.
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Returns a reference to the underlying order store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The UTC offset the dashboard shows instants in.
    pub fn offset(&self) -> FixedOffset {
        *self.clock.now().offset()
    }

    /// Lists orders passing `filter`, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, filter: StatusFilter) -> Result<Vec<Order>> {
        let orders = self.store.list_orders().await?;
        Ok(filter_by_status(&orders, filter)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Loads one order.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order> {
        Ok(self.store.get_order(id).await?)
    }

    /// Moves an order to `target` if the workflow allows it.
    #[tracing::instrument(skip(self))]
    pub async fn change_status(&self, id: &OrderId, target: OrderStatus) -> Result<Order> {
        let current = self.store.get_order(id).await?;
        self.transition(&current, target).await
    }

    /// Moves an order one step along the happy path.
    #[tracing::instrument(skip(self))]
    pub async fn advance_order(&self, id: &OrderId) -> Result<Order> {
        let current = self.store.get_order(id).await?;
        let status = current.status();
        let Some(target) = next_status(status) else {
            metrics::counter!("order_status_transitions_rejected_total").increment(1);
            return Err(OrderError::NoNextStatus { current: status }.into());
        };
        self.transition(&current, target).await
    }

    /// Cancels an order that has not yet been delivered.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, id: &OrderId) -> Result<Order> {
        self.change_status(id, OrderStatus::Cancelled).await
    }

    /// Computes the dashboard overview at the clock's current instant.
    #[tracing::instrument(skip(self))]
    pub async fn overview(&self) -> Result<DashboardOverview> {
        let orders = self.store.list_orders().await?;
        let now = self.clock.now();
        let summary = summarize(&orders, &now);
        Ok(DashboardOverview::from_summary(now, summary))
    }

    async fn transition(&self, current: &Order, target: OrderStatus) -> Result<Order> {
        let from = current.status();
        let next = apply_transition(current, target).inspect_err(|err| {
            metrics::counter!("order_status_transitions_rejected_total").increment(1);
            tracing::warn!(order_id = %current.id(), %from, %target, error = %err, "transition rejected");
        })?;

        let stored = self
            .store
            .update_order_status(next.id(), next.status(), UpdateOptions::expect_status(from))
            .await?;

        metrics::counter!("order_status_transitions_total", "to" => target.as_str()).increment(1);
        tracing::info!(order_id = %stored.id(), %from, to = %stored.status(), "order status changed");
        Ok(stored)
    }
}
