//! Order workflow service and dashboard read model.
//!
//! Ties the pure workflow engine to an [`OrderStore`](order_store::OrderStore):
//! - [`OrderWorkflowService`] re-validates every status change against a
//!   freshly fetched order before writing it back
//! - [`DashboardOverview`] is the stat-card snapshot the dashboard renders

pub mod error;
pub mod overview;
pub mod service;

pub use error::{Result, WorkflowError};
pub use overview::{DashboardOverview, StatusTab};
pub use service::OrderWorkflowService;
