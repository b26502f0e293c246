//! Order listing and status workflow endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use chrono::FixedOffset;
use common::OrderId;
use dashboard::OrderWorkflowService;
use domain::{Order, OrderItem, OrderStatus, StatusFilter, allowed_transitions, next_status};
use order_store::OrderStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore> {
    pub workflow: OrderWorkflowService<S>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub short_code: String,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    pub total_cents: i64,
    pub total_display: String,
    pub created_at: String,
    pub next_status: Option<OrderStatus>,
    pub can_cancel: bool,
}

impl OrderResponse {
    /// Renders `order` with its instants shown at `offset`.
    pub fn new(order: &Order, offset: &FixedOffset) -> Self {
        let status = order.status();
        Self {
            id: order.id().to_string(),
            short_code: order.short_code(),
            status,
            status_label: status.label(),
            customer_name: order.customer_name().to_string(),
            customer_phone: order.customer().and_then(|c| c.phone.clone()),
            delivery_address: order.delivery_address().map(String::from),
            total_cents: order.total().cents(),
            total_display: order.total().to_string(),
            created_at: order.created_at().with_timezone(offset).to_rfc3339(),
            next_status: next_status(status),
            can_cancel: allowed_transitions(status).contains(&OrderStatus::Cancelled),
        }
    }
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: Option<String>,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub total_price_cents: i64,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.as_ref().map(|p| p.to_string()),
            product_name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            total_price_cents: item.total_price().cents(),
        }
    }
}

#[derive(Serialize)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
    pub subtotal_cents: i64,
    pub delivery_fee_cents: i64,
    pub discount_cents: i64,
    pub payment_method: Option<String>,
    pub payment_method_label: Option<&'static str>,
    pub notes: Option<String>,
    pub allowed_transitions: Vec<OrderStatus>,
}

impl OrderDetailResponse {
    pub fn new(order: &Order, offset: &FixedOffset) -> Self {
        let pricing = order.pricing();
        Self {
            order: OrderResponse::new(order, offset),
            items: order.items().iter().map(OrderItemResponse::from).collect(),
            subtotal_cents: pricing.subtotal.cents(),
            delivery_fee_cents: pricing.delivery_fee.cents(),
            discount_cents: pricing.discount.cents(),
            payment_method: order.payment_method().map(|m| m.to_string()),
            payment_method_label: order.payment_method().map(|m| m.label()),
            notes: order.notes().map(String::from),
            allowed_transitions: allowed_transitions(order.status()),
        }
    }
}

// -- Handlers --

/// GET /orders?status= — list orders, optionally filtered by status.
#[tracing::instrument(skip(state))]
pub async fn list<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let filter = match params.status.as_deref() {
        Some(raw) => raw.parse::<StatusFilter>()?,
        None => StatusFilter::All,
    };

    let orders = state.workflow.list_orders(filter).await?;
    let offset = state.workflow.offset();
    Ok(Json(
        orders
            .iter()
            .map(|order| OrderResponse::new(order, &offset))
            .collect(),
    ))
}

/// GET /orders/{id} — order detail with the transitions on offer.
#[tracing::instrument(skip(state))]
pub async fn get<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let order = state.workflow.get_order(&OrderId::from(id)).await?;
    Ok(Json(OrderDetailResponse::new(&order, &state.workflow.offset())))
}

/// POST /orders/{id}/advance — move the order one step forward.
#[tracing::instrument(skip(state))]
pub async fn advance<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let order = state.workflow.advance_order(&OrderId::from(id)).await?;
    Ok(Json(OrderDetailResponse::new(&order, &state.workflow.offset())))
}

/// POST /orders/{id}/cancel — cancel an order that is not yet delivered.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let order = state.workflow.cancel_order(&OrderId::from(id)).await?;
    Ok(Json(OrderDetailResponse::new(&order, &state.workflow.offset())))
}

/// PUT /orders/{id}/status — request an explicit transition.
#[tracing::instrument(skip(state))]
pub async fn set_status<S: OrderStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<StatusChangeRequest>, JsonRejection>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let Json(req) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let target: OrderStatus = req.status.parse()?;
    let order = state
        .workflow
        .change_status(&OrderId::from(id), target)
        .await?;
    Ok(Json(OrderDetailResponse::new(&order, &state.workflow.offset())))
}
