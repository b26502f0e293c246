//! The order record the workflow engine reasons about.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use super::{CustomerRef, Money, OrderItem, OrderStatus, PaymentMethod, Pricing};

/// One customer purchase tracked through the delivery lifecycle.
///
/// The status is private: it changes only through
/// [`apply_transition`](super::apply_transition), or when a storage adapter
/// rehydrates a stored row through [`Order::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    status: OrderStatus,
    customer: Option<CustomerRef>,
    items: Vec<OrderItem>,
    pricing: Pricing,
    total: Money,
    payment_method: Option<PaymentMethod>,
    delivery_address: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

/// The full field set of an [`Order`], used by storage adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParts {
    pub id: OrderId,
    pub status: OrderStatus,
    pub customer: Option<CustomerRef>,
    pub items: Vec<OrderItem>,
    pub pricing: Pricing,
    pub total: Money,
    pub payment_method: Option<PaymentMethod>,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a pending order. The total is derived from the pricing.
    pub fn new(id: impl Into<OrderId>, pricing: Pricing, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            status: OrderStatus::Pending,
            customer: None,
            items: Vec::new(),
            pricing,
            total: pricing.total(),
            payment_method: None,
            delivery_address: None,
            notes: None,
            created_at,
        }
    }

    /// Attaches the customer who placed the order.
    pub fn with_customer(mut self, customer: CustomerRef) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Sets the line items.
    pub fn with_items(mut self, items: Vec<OrderItem>) -> Self {
        self.items = items;
        self
    }

    /// Sets the payment method.
    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = Some(method);
        self
    }

    /// Sets the delivery address.
    pub fn with_delivery_address(mut self, address: impl Into<String>) -> Self {
        self.delivery_address = Some(address.into());
        self
    }

    /// Sets free-form notes from the customer.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Rebuilds an order from stored fields, status included.
    pub fn from_parts(parts: OrderParts) -> Self {
        Self {
            id: parts.id,
            status: parts.status,
            customer: parts.customer,
            items: parts.items,
            pricing: parts.pricing,
            total: parts.total,
            payment_method: parts.payment_method,
            delivery_address: parts.delivery_address,
            notes: parts.notes,
            created_at: parts.created_at,
        }
    }

    /// Decomposes the order into its stored fields.
    pub fn into_parts(self) -> OrderParts {
        OrderParts {
            id: self.id,
            status: self.status,
            customer: self.customer,
            items: self.items,
            pricing: self.pricing,
            total: self.total,
            payment_method: self.payment_method,
            delivery_address: self.delivery_address,
            notes: self.notes,
            created_at: self.created_at,
        }
    }

    pub(super) fn with_status(&self, status: OrderStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn customer(&self) -> Option<&CustomerRef> {
        self.customer.as_ref()
    }

    /// Name shown for the order; orders may have no identified customer.
    pub fn customer_name(&self) -> &str {
        self.customer
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Cliente nao identificado")
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn delivery_address(&self) -> Option<&str> {
        self.delivery_address.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// The `#ABCD1234` reference operators read out.
    pub fn short_code(&self) -> String {
        self.id.short_code()
    }
}
