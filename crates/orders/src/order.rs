use rust_decimal::Decimal;
use serde::Deserialize;

/// Order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Paid,
    Pending,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [Self::Paid, Self::Pending, Self::Cancelled];

    /// Parse the wire form (`PAID`, `PENDING`, `CANCELLED`). Matching is exact.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PAID" => Some(Self::Paid),
            "PENDING" => Some(Self::Pending),
            "CANCELLED" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "PAID",
            Self::Pending => "PENDING",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Paid and pending orders must carry at least one line.
    pub fn requires_lines(self) -> bool {
        matches!(self, Self::Paid | Self::Pending)
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric field (quantity, price, refund, fee).
///
/// Numbers beyond `Decimal`'s range are still real numbers to the rules, so
/// their sign is kept even though no exact value is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Amount {
    Exact(Decimal),
    OutOfRange { negative: bool },
}

impl Amount {
    pub const ZERO: Amount = Amount::Exact(Decimal::ZERO);

    /// Convert a JSON number. Non-finite values yield `None`.
    pub fn from_number(number: &serde_json::Number) -> Option<Self> {
        if let Some(i) = number.as_i64() {
            return Some(Self::Exact(Decimal::from(i)));
        }
        if let Some(u) = number.as_u64() {
            return Some(Self::Exact(Decimal::from(u)));
        }
        Self::from_f64(number.as_f64()?)
    }

    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        // Shortest round-trip text keeps `0.1` as exactly 0.1.
        let exact = value
            .to_string()
            .parse::<Decimal>()
            .ok()
            .or_else(|| Decimal::try_from(value).ok());
        Some(match exact {
            Some(d) => Self::Exact(d),
            None => Self::OutOfRange {
                negative: value < 0.0,
            },
        })
    }

    pub fn exact(self) -> Option<Decimal> {
        match self {
            Self::Exact(d) => Some(d),
            Self::OutOfRange { .. } => None,
        }
    }

    pub fn is_positive(self) -> bool {
        match self {
            Self::Exact(d) => d > Decimal::ZERO,
            Self::OutOfRange { negative } => !negative,
        }
    }

    pub fn is_negative(self) -> bool {
        match self {
            Self::Exact(d) => d < Decimal::ZERO,
            Self::OutOfRange { negative } => negative,
        }
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::Exact(value)
    }
}

/// Order line: sku, quantity, unit price.
///
/// Every field is optional on the wire. Accessors fall back to an empty sku
/// and zero for numbers so rules can be evaluated without special cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LineItem {
    #[serde(deserialize_with = "lenient::string")]
    pub sku: Option<String>,
    #[serde(deserialize_with = "lenient::amount")]
    pub qty: Option<Amount>,
    #[serde(deserialize_with = "lenient::amount")]
    pub price: Option<Amount>,
}

impl LineItem {
    pub fn new(sku: impl Into<String>, qty: Decimal, price: Decimal) -> Self {
        Self {
            sku: Some(sku.into()),
            qty: Some(qty.into()),
            price: Some(price.into()),
        }
    }

    pub fn sku(&self) -> &str {
        self.sku.as_deref().unwrap_or_default()
    }

    pub fn qty(&self) -> Amount {
        self.qty.unwrap_or(Amount::ZERO)
    }

    pub fn price(&self) -> Amount {
        self.price.unwrap_or(Amount::ZERO)
    }

    /// `qty × price`, no rounding. `None` when the product does not fit in
    /// a `Decimal`.
    pub fn total(&self) -> Option<Decimal> {
        self.qty().exact()?.checked_mul(self.price().exact()?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Customer {
    #[serde(deserialize_with = "lenient::string")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Payment {
    /// Truthiness of the wire value (`true`, non-zero, non-empty).
    #[serde(deserialize_with = "lenient::truthy")]
    pub captured: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Refund {
    #[serde(deserialize_with = "lenient::amount")]
    pub amount: Option<Amount>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Shipping {
    #[serde(deserialize_with = "lenient::amount")]
    pub fee: Option<Amount>,
}

/// One purchase record as found in the document.
///
/// Decoding never fails for an object: a field of the wrong type reads as
/// absent, and a sub-object that is absent, `null` or not an object reads as
/// its empty value. `status` keeps the raw string; see [`Order::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Order {
    #[serde(deserialize_with = "lenient::string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient::string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient::object")]
    pub customer: Customer,
    #[serde(deserialize_with = "lenient::lines")]
    pub lines: Vec<LineItem>,
    #[serde(deserialize_with = "lenient::object")]
    pub payment: Payment,
    #[serde(deserialize_with = "lenient::object")]
    pub refund: Refund,
    #[serde(deserialize_with = "lenient::object")]
    pub shipping: Shipping,
}

impl Order {
    pub fn new(id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            id: Some(id.into()),
            status: Some(status.as_str().to_string()),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.customer.email = Some(email.into());
        self
    }

    pub fn with_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn with_captured(mut self, captured: bool) -> Self {
        self.payment.captured = Some(captured);
        self
    }

    pub fn with_refund(mut self, amount: Decimal) -> Self {
        self.refund.amount = Some(amount.into());
        self
    }

    pub fn with_shipping_fee(mut self, fee: Decimal) -> Self {
        self.shipping.fee = Some(fee.into());
        self
    }

    /// Order id, empty when absent.
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    /// Parsed status; `None` when absent or not one of the known values.
    pub fn status(&self) -> Option<OrderStatus> {
        self.status.as_deref().and_then(OrderStatus::parse)
    }

    pub fn is_status(&self, status: OrderStatus) -> bool {
        self.status() == Some(status)
    }

    pub fn email(&self) -> Option<&str> {
        self.customer.email.as_deref()
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn is_captured(&self) -> bool {
        self.payment.captured.unwrap_or(false)
    }

    pub fn refund_amount(&self) -> Option<Amount> {
        self.refund.amount
    }

    pub fn shipping_fee(&self) -> Option<Amount> {
        self.shipping.fee
    }

    /// Σ(qty × price) over all lines; zero without lines. `None` when a
    /// product or the running sum does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        self.lines
            .iter()
            .try_fold(Decimal::ZERO, |sum, line| sum.checked_add(line.total()?))
    }
}

/// Field decoders that read a wrong-typed value as absent instead of failing.
mod lenient {
    use rust_decimal::Decimal;
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{Amount, LineItem};

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn amount<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Amount>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(n) => Amount::from_number(&n),
            Value::String(s) => s.trim().parse::<Decimal>().ok().map(Amount::Exact),
            _ => None,
        })
    }

    pub fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Null => None,
            Value::Bool(b) => Some(b),
            Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
            Value::String(s) => Some(!s.is_empty()),
            Value::Array(items) => Some(!items.is_empty()),
            Value::Object(map) => Some(!map.is_empty()),
        })
    }

    pub fn object<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned + Default,
    {
        Ok(match Value::deserialize(d)? {
            value @ Value::Object(_) => T::deserialize(value).unwrap_or_default(),
            _ => T::default(),
        })
    }

    /// A non-sequence reads as no lines; a non-object line as an empty line.
    pub fn lines<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<LineItem>, D::Error> {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .map(|item| match item {
                Value::Object(_) => LineItem::deserialize(item).unwrap_or_default(),
                _ => LineItem::default(),
            })
            .collect())
    }
}
