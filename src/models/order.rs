use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Placeholder shown for a customer with no recorded name.
pub const UNKNOWN_CUSTOMER: &str = "Unknown";
/// Placeholder for missing address, phone and timestamp values.
pub const NOT_AVAILABLE: &str = "N/A";

/// Fulfillment stage of an order.
///
/// The wire values are the strings stored in the `status` field of each order
/// document; they are shared with the storefront that creates the orders.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
pub enum OrderStatus {
    /// Order received, nobody has picked it up yet.
    #[default]
    #[serde(rename = "กำลังดำเนินการ")]
    #[strum(serialize = "กำลังดำเนินการ")]
    Pending,
    /// Being packed.
    #[serde(rename = "กำลังเตรียม")]
    #[strum(serialize = "กำลังเตรียม")]
    Preparing,
    /// Handed over to a carrier.
    #[serde(rename = "กำลังจัดส่ง")]
    #[strum(serialize = "กำลังจัดส่ง")]
    Shipping,
}

impl OrderStatus {
    /// Statuses an operator may pick from the status selector.
    pub fn selectable() -> impl Iterator<Item = OrderStatus> {
        OrderStatus::iter().filter(|status| *status != OrderStatus::Pending)
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "กำลังดำเนินการ",
            OrderStatus::Preparing => "กำลังเตรียม",
            OrderStatus::Shipping => "กำลังจัดส่ง",
        }
    }
}

/// Carrier assigned to deliver an order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ShippingProvider {
    Spx,
    Kerry,
    Flash,
}

impl ShippingProvider {
    /// Parses a stored or submitted provider value; empty means "none chosen".
    pub fn parse_optional(raw: &str) -> Result<Option<Self>, strum::ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        trimmed.parse().map(Some)
    }

    /// Wire form of an optional provider; `None` is stored as an empty string.
    pub fn wire_value(provider: Option<ShippingProvider>) -> String {
        provider.map(|p| p.to_string()).unwrap_or_default()
    }
}

/// Delivery contact attached to an order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl Default for Customer {
    fn default() -> Self {
        Self {
            name: UNKNOWN_CUSTOMER.to_string(),
            address: NOT_AVAILABLE.to_string(),
            phone: NOT_AVAILABLE.to_string(),
        }
    }
}

/// One product entry within an order's cart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl LineItem {
    /// Cell text for the items column, e.g. `Widget (x2)`.
    pub fn summary(&self) -> String {
        format!("{} (x{})", self.name, self.quantity)
    }
}

/// A customer order as held by the board.
///
/// Every `Order` has non-empty customer fields and a status; defaults are
/// substituted once when the document is loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub shipping_provider: Option<ShippingProvider>,
    pub tracking_number: String,
    pub placed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total rounded to whole currency units, e.g. `$10`.
    pub fn total_display(&self) -> String {
        let rounded = self
            .total_price
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        format!("${}", rounded.normalize())
    }

    pub fn placed_at_display(&self) -> String {
        self.placed_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn order_with_total(total: &str) -> Order {
        Order {
            id: "o1".into(),
            customer: Customer::default(),
            items: vec![],
            total_price: Decimal::from_str(total).unwrap(),
            status: OrderStatus::default(),
            shipping_provider: None,
            tracking_number: String::new(),
            placed_at: None,
        }
    }

    #[rstest]
    #[case("10", "$10")]
    #[case("10.00", "$10")]
    #[case("10.5", "$11")]
    #[case("10.49", "$10")]
    #[case("0", "$0")]
    fn total_is_rounded_to_whole_units(#[case] total: &str, #[case] expected: &str) {
        assert_eq!(order_with_total(total).total_display(), expected);
    }

    #[test]
    fn status_wire_values_round_trip_through_strum() {
        for status in OrderStatus::iter() {
            assert_eq!(OrderStatus::from_str(status.as_wire()).unwrap(), status);
            assert_eq!(status.to_string(), status.as_wire());
        }
    }

    #[test]
    fn pending_is_not_selectable() {
        let selectable: Vec<_> = OrderStatus::selectable().collect();
        assert_eq!(
            selectable,
            vec![OrderStatus::Preparing, OrderStatus::Shipping]
        );
    }

    #[test]
    fn provider_parsing_treats_blank_as_none() {
        assert_eq!(ShippingProvider::parse_optional("").unwrap(), None);
        assert_eq!(ShippingProvider::parse_optional("  ").unwrap(), None);
        assert_eq!(
            ShippingProvider::parse_optional("KERRY").unwrap(),
            Some(ShippingProvider::Kerry)
        );
        assert!(ShippingProvider::parse_optional("DHL").is_err());
        assert_eq!(ShippingProvider::wire_value(None), "");
        assert_eq!(ShippingProvider::wire_value(Some(ShippingProvider::Spx)), "SPX");
    }

    #[test]
    fn missing_timestamp_renders_placeholder() {
        assert_eq!(order_with_total("1").placed_at_display(), "N/A");
    }
}
