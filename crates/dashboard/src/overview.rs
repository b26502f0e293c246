//! Dashboard overview read model.

use chrono::{DateTime, FixedOffset};
use domain::{Money, OrderStatus, OrderSummary, StatusCounts, StatusFilter};
use serde::Serialize;

/// One filter tab on the orders page, e.g. `Pendente (3)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusTab {
    pub filter: StatusFilter,
    pub label: &'static str,
    pub count: usize,
}

/// What the dashboard shows at a glance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardOverview {
    /// The instant the figures were computed for, in the dashboard's zone.
    pub as_of: DateTime<FixedOffset>,
    pub total_orders: usize,
    pub pending: usize,
    pub preparing: usize,
    pub delivering: usize,
    pub delivered_today: usize,
    pub today_revenue: Money,
    pub counts: StatusCounts,
}

impl DashboardOverview {
    /// Builds the overview from a summary computed at `as_of`.
    pub fn from_summary(as_of: DateTime<FixedOffset>, summary: OrderSummary) -> Self {
        let counts = summary.count_by_status;
        Self {
            as_of,
            total_orders: counts.total(),
            pending: counts.get(OrderStatus::Pending),
            preparing: counts.get(OrderStatus::Preparing),
            delivering: counts.get(OrderStatus::Delivering),
            delivered_today: summary.delivered_today,
            today_revenue: summary.today_revenue,
            counts,
        }
    }

    /// The "all" tab followed by one tab per status.
    pub fn status_tabs(&self) -> Vec<StatusTab> {
        let all = StatusTab {
            filter: StatusFilter::All,
            label: "Todos",
            count: self.total_orders,
        };
        std::iter::once(all)
            .chain(OrderStatus::ALL.into_iter().map(|status| StatusTab {
                filter: StatusFilter::Only(status),
                label: status.label(),
                count: self.counts.get(status),
            }))
            .collect()
    }
}
