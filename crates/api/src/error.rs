//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dashboard::WorkflowError;
use domain::OrderError;
use order_store::OrderStoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Workflow or storage error.
    Workflow(WorkflowError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Workflow(err) => workflow_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn workflow_error_to_response(err: WorkflowError) -> (StatusCode, String) {
    let status = match &err {
        WorkflowError::Order(order_err) => match order_err {
            OrderError::InvalidTransition { .. } | OrderError::NoNextStatus { .. } => {
                StatusCode::CONFLICT
            }
            OrderError::UnknownStatus(_)
            | OrderError::InvalidAmount(_)
            | OrderError::UnknownPaymentMethod(_) => StatusCode::BAD_REQUEST,
        },
        WorkflowError::Store(store_err) => match store_err {
            OrderStoreError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderStoreError::StatusConflict { .. } | OrderStoreError::AlreadyExists(_) => {
                StatusCode::CONFLICT
            }
            OrderStoreError::Database(_)
            | OrderStoreError::Migration(_)
            | OrderStoreError::Order(_) => StatusCode::INTERNAL_SERVER_ERROR,
        },
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "internal server error");
    }
    (status, err.to_string())
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        ApiError::Workflow(err)
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Workflow(WorkflowError::Order(err))
    }
}
