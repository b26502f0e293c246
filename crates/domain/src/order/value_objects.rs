//! Value objects for the order domain.

use std::str::FromStr;

use common::CustomerId;
use serde::{Deserialize, Serialize};

use super::OrderError;

/// Product identifier as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Money amount represented in centavos to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in centavos (e.g., 1000 = R$ 10,00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from centavos.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Parses an exact decimal amount such as `"10.50"` or `"7"`.
    ///
    /// At most two fractional digits are accepted; anything that would need
    /// rounding is rejected.
    pub fn from_decimal_str(s: &str) -> Result<Self, OrderError> {
        let invalid = || OrderError::InvalidAmount(s.to_string());

        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) || fraction.len() > 2 {
            return Err(invalid());
        }

        let whole: i64 = whole.parse().map_err(|_| invalid())?;
        let fraction_cents: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => fraction.parse().map_err(|_| invalid())?,
        };

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_cents))
            .ok_or_else(invalid)?;

        Ok(Self::from_cents(if negative { -cents } else { cents }))
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in centavos.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * i64::from(quantity),
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

/// Brazilian real format: `R$ 1.234,56`.
impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let abs = self.cents.unsigned_abs();
        let reais = (abs / 100).to_string();

        let mut grouped = String::with_capacity(reais.len() + reais.len() / 3);
        for (i, digit) in reais.chars().enumerate() {
            if i > 0 && (reais.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(digit);
        }

        let sign = if self.cents < 0 { "-" } else { "" };
        write!(f, "{sign}R$ {grouped},{:02}", abs % 100)
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents - rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// How the customer pays on delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Pix,
}

impl PaymentMethod {
    /// Returns the wire name of the payment method.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::CreditCard => "credit_card",
            PaymentMethod::DebitCard => "debit_card",
            PaymentMethod::Pix => "pix",
        }
    }

    /// Returns the label operators see on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Dinheiro",
            PaymentMethod::CreditCard => "Cartao de Credito",
            PaymentMethod::DebitCard => "Cartao de Debito",
            PaymentMethod::Pix => "PIX",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "credit_card" => Ok(PaymentMethod::CreditCard),
            "debit_card" => Ok(PaymentMethod::DebitCard),
            "pix" => Ok(PaymentMethod::Pix),
            other => Err(OrderError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Snapshot of the customer attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRef {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
}

impl CustomerRef {
    /// Creates a customer reference without a phone number.
    pub fn new(id: impl Into<CustomerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            phone: None,
        }
    }

    /// Attaches a phone number.
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// A line item in an order.
///
/// The product name is a snapshot taken when the order was placed, so later
/// catalog edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Catalog product, if it still exists.
    pub product_id: Option<ProductId>,

    /// Product name at the time of ordering.
    pub product_name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(product_name: impl Into<String>, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id: None,
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Links the item to a catalog product.
    pub fn with_product(mut self, product_id: impl Into<ProductId>) -> Self {
        self.product_id = Some(product_id.into());
        self
    }

    /// Returns the total price for this item (quantity * unit_price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Price breakdown of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pricing {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub discount: Money,
}

impl Pricing {
    /// Pricing with only a subtotal, no fee and no discount.
    pub fn subtotal(subtotal: Money) -> Self {
        Self {
            subtotal,
            ..Self::default()
        }
    }

    /// Sets the delivery fee.
    pub fn with_delivery_fee(mut self, fee: Money) -> Self {
        self.delivery_fee = fee;
        self
    }

    /// Sets the discount.
    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        self
    }

    /// subtotal + delivery fee - discount
    pub fn total(&self) -> Money {
        self.subtotal + self.delivery_fee - self.discount
    }
}
