//! Order status state machine.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::OrderError;

/// The status of an order in its delivery lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──► Confirmed ──► Preparing ──► Delivering ──► Delivered
///    │            │             │              │
///    └────────────┴─────────────┴──────────────┴──► Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been placed and awaits confirmation.
    Pending,

    /// Order was accepted by the store.
    Confirmed,

    /// Kitchen is preparing the order.
    Preparing,

    /// Order is out for delivery.
    Delivering,

    /// Order reached the customer (terminal state).
    Delivered,

    /// Order was cancelled (terminal state).
    Cancelled,
}

/// The happy path every order walks, in order.
///
/// Forward transitions are defined by position in this array, never by the
/// declaration order of [`OrderStatus`]. `Cancelled` is a side branch and is
/// deliberately absent.
pub const STATUS_FLOW: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
    OrderStatus::Delivering,
    OrderStatus::Delivered,
];

impl OrderStatus {
    /// Every status, in display order.
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Returns true if this is a terminal status (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Returns the label operators see on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendente",
            OrderStatus::Confirmed => "Confirmado",
            OrderStatus::Preparing => "Preparando",
            OrderStatus::Delivering => "Em Entrega",
            OrderStatus::Delivered => "Entregue",
            OrderStatus::Cancelled => "Cancelado",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = OrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
