//! Dashboard aggregates over an order collection.
//!
//! "Today" is the calendar date of `now` in `now`'s own time zone. Order
//! creation instants are converted into that zone before comparing dates,
//! so the caller picks the day boundary by the clock it injects.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::{Money, Order, OrderError, OrderStatus};

/// Number of orders in each status. Every status has an entry, zero or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCounts(BTreeMap<OrderStatus, usize>);

impl StatusCounts {
    /// All six statuses at zero.
    pub fn new() -> Self {
        Self(OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect())
    }

    /// Count for one status.
    pub fn get(&self, status: OrderStatus) -> usize {
        self.0.get(&status).copied().unwrap_or(0)
    }

    /// Sum over all statuses.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Iterates `(status, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (OrderStatus, usize)> + '_ {
        self.0.iter().map(|(s, c)| (*s, *c))
    }

    fn increment(&mut self, status: OrderStatus) {
        *self.0.entry(status).or_insert(0) += 1;
    }
}

impl Default for StatusCounts {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregates shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Orders currently in each status.
    pub count_by_status: StatusCounts,

    /// Delivered orders created on the reference day.
    pub delivered_today: usize,

    /// Sum of `total` over the orders counted in `delivered_today`.
    pub today_revenue: Money,
}

impl OrderSummary {
    /// Number of orders summarized.
    pub fn total_orders(&self) -> usize {
        self.count_by_status.total()
    }
}

/// Summarizes `orders` relative to `now`, in a single pass.
pub fn summarize<Tz: TimeZone>(orders: &[Order], now: &DateTime<Tz>) -> OrderSummary {
    let zone = now.timezone();
    let today = now.date_naive();

    let mut summary = OrderSummary::default();
    for order in orders {
        summary.count_by_status.increment(order.status());

        if order.status() == OrderStatus::Delivered
            && order.created_at().with_timezone(&zone).date_naive() == today
        {
            summary.delivered_today += 1;
            summary.today_revenue += order.total();
        }
    }
    summary
}

/// Which orders a list view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    /// Every order.
    #[default]
    All,
    /// Only orders in this status.
    Only(OrderStatus),
}

impl StatusFilter {
    /// Returns true if an order in `status` passes the filter.
    pub fn matches(&self, status: OrderStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl From<OrderStatus> for StatusFilter {
    fn from(status: OrderStatus) -> Self {
        StatusFilter::Only(status)
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Only(status) => write!(f, "{status}"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StatusFilter::All);
        }
        s.parse().map(StatusFilter::Only)
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = OrderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        filter.to_string()
    }
}

/// Orders passing `filter`, in their original relative order.
pub fn filter_by_status(orders: &[Order], filter: StatusFilter) -> Vec<&Order> {
    orders.iter().filter(|o| filter.matches(o.status())).collect()
}
