//! Workflow service error types.

use domain::OrderError;
use order_store::OrderStoreError;
use thiserror::Error;

/// Errors that can occur while driving an order through the workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The order store failed or rejected the write.
    #[error("Order store error: {0}")]
    Store(#[from] OrderStoreError),

    /// The workflow engine rejected the request.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),
}

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;
