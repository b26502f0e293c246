//! Order model, status workflow, and dashboard aggregates.

mod model;
mod status;
mod summary;
mod value_objects;
mod workflow;

pub use model::{Order, OrderParts};
pub use status::{OrderStatus, STATUS_FLOW};
pub use summary::{OrderSummary, StatusCounts, StatusFilter, filter_by_status, summarize};
pub use value_objects::{CustomerRef, Money, OrderItem, PaymentMethod, Pricing, ProductId};
pub use workflow::{allowed_transitions, apply_transition, can_transition, next_status};

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The requested status change violates the workflow.
    #[error("Invalid status transition: cannot move from {current} to {target}")]
    InvalidTransition {
        current: OrderStatus,
        target: OrderStatus,
    },

    /// A status string from outside the type system was not recognised.
    #[error("Unknown order status: {0:?}")]
    UnknownStatus(String),

    /// Advance was requested on an order with nowhere left to go.
    #[error("Order in {current} status has no next status")]
    NoNextStatus { current: OrderStatus },

    /// A monetary amount could not be parsed exactly.
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),

    /// A payment method string was not recognised.
    #[error("Unknown payment method: {0:?}")]
    UnknownPaymentMethod(String),
}
