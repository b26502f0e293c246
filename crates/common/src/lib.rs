//! Shared identifier types for the delivery order workflow.

mod types;

pub use types::{CustomerId, OrderId};
