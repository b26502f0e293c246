//! Order workflow engine for the delivery dashboard.
//!
//! This crate is pure logic over plain values:
//! - [`OrderStatus`] and the fixed [`STATUS_FLOW`]
//! - transition queries ([`next_status`], [`can_transition`]) and
//!   [`apply_transition`], which never mutates its input
//! - dashboard aggregates ([`summarize`]) and list filtering
//!   ([`filter_by_status`])
//! - the injected [`Clock`] that decides what "today" means

pub mod clock;
pub mod order;

pub use clock::{Clock, FixedClock, SystemClock};
pub use common::{CustomerId, OrderId};
pub use order::{
    CustomerRef, Money, Order, OrderError, OrderItem, OrderParts, OrderStatus, OrderSummary,
    PaymentMethod, Pricing, ProductId, STATUS_FLOW, StatusCounts, StatusFilter,
    allowed_transitions, apply_transition, can_transition, filter_by_status, next_status,
    summarize,
};
