//! Dashboard overview endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use dashboard::StatusTab;
use domain::StatusCounts;
use order_store::OrderStore;
use serde::Serialize;

use super::orders::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct DashboardResponse {
    pub as_of: String,
    pub total_orders: usize,
    pub pending: usize,
    pub preparing: usize,
    pub delivering: usize,
    pub delivered_today: usize,
    pub today_revenue_cents: i64,
    pub today_revenue_display: String,
    pub counts: StatusCounts,
    pub tabs: Vec<StatusTab>,
}

/// GET /dashboard — stat cards and status tab counts.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let overview = state.workflow.overview().await?;
    let tabs = overview.status_tabs();

    Ok(Json(DashboardResponse {
        as_of: overview.as_of.to_rfc3339(),
        total_orders: overview.total_orders,
        pending: overview.pending,
        preparing: overview.preparing,
        delivering: overview.delivering,
        delivered_today: overview.delivered_today,
        today_revenue_cents: overview.today_revenue.cents(),
        today_revenue_display: overview.today_revenue.to_string(),
        counts: overview.counts,
        tabs,
    }))
}
