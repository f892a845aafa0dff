//! Product identity, money and snapshot types
//!
//! The backend catalog sends product ids as numbers and prices as decimal
//! strings; everything here normalizes those wire shapes into the canonical
//! forms the cart keys and computes with.

use std::borrow::Cow;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::errors::CartError;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Unique product identifier in canonical string form.
///
/// The backend emits numeric ids while stored carts key by string; both wire
/// forms deserialize to the same canonical value so one product can never
/// occupy two cart lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductId(pub Cow<'static, str>);

impl ProductId {
    /// Creates a new product ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// Creates a product ID from a static string slice (zero-copy).
    #[must_use]
    pub fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Creates a product ID from a backend numeric id.
    #[must_use]
    pub fn from_numeric(id: u64) -> Self {
        Self(Cow::Owned(id.to_string()))
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ProductId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct IdVisitor;

        impl Visitor<'_> for IdVisitor {
            type Value = ProductId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a product id as a string or an integer")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(ProductId::new(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(ProductId::from_numeric(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(ProductId::new(value.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

/// Currency code (ISO 4217).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency(pub String);

impl Currency {
    /// Creates a new currency code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// US Dollar.
    #[must_use]
    pub fn usd() -> Self {
        Self("USD".to_string())
    }

    /// Euro.
    #[must_use]
    pub fn eur() -> Self {
        Self("EUR".to_string())
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

/// Price with currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents).
    pub amount:   u64,
    /// Currency code.
    pub currency: Currency,
    /// Number of decimal places.
    pub decimals: u8,
}

impl Price {
    /// Creates a new price.
    #[must_use]
    pub fn new(amount: u64, currency: Currency, decimals: u8) -> Self {
        Self { amount, currency, decimals }
    }

    /// Creates a USD price in cents.
    #[must_use]
    pub fn usd(amount: u64) -> Self {
        Self::new(amount, Currency::usd(), 2)
    }

    /// Parses a backend decimal string (`"10"`, `"5.5"`, `"10.99"`) into
    /// minor units, rounding half-up past the configured two decimals.
    ///
    /// The backend sends an empty string for unset prices; that parses as
    /// zero rather than an error.
    pub fn from_decimal_str(value: &str, currency: Currency) -> Result<Self, CartError> {
        const DECIMALS: u8 = 2;
        let scale = 10u64.pow(u32::from(DECIMALS));

        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::new(0, currency, DECIMALS));
        }

        let invalid = || CartError::Serialization(format!("invalid price: {value:?}"));

        let (int_part, frac_part) = match trimmed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (trimmed, ""),
        };
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
            || (int_part.is_empty() && frac_part.is_empty())
        {
            return Err(invalid());
        }

        let int: u64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| invalid())?
        };

        let kept = &frac_part[..frac_part.len().min(usize::from(DECIMALS))];
        let mut frac: u64 = if kept.is_empty() { 0 } else { kept.parse().map_err(|_| invalid())? };
        // pad "5.5" out to 50 cents
        frac *= 10u64.pow(u32::from(DECIMALS) - kept.len() as u32);

        let round_up = frac_part
            .chars()
            .nth(usize::from(DECIMALS))
            .is_some_and(|digit| digit >= '5');

        let amount = int
            .checked_mul(scale)
            .and_then(|minor| minor.checked_add(frac))
            .and_then(|minor| minor.checked_add(u64::from(round_up)))
            .ok_or_else(invalid)?;

        Ok(Self::new(amount, currency, DECIMALS))
    }

    /// Returns the display amount (with decimals applied).
    #[must_use]
    pub fn display_amount(&self) -> f64 {
        let divisor = 10_u64.pow(u32::from(self.decimals));
        self.amount as f64 / divisor as f64
    }

    /// Formats the amount with all decimal places, e.g. `"25.50"`.
    #[must_use]
    pub fn format(&self) -> String {
        if self.decimals == 0 {
            return self.amount.to_string();
        }
        let divisor = 10_u64.pow(u32::from(self.decimals));
        format!(
            "{}.{:0width$}",
            self.amount / divisor,
            self.amount % divisor,
            width = usize::from(self.decimals)
        )
    }
}

impl Default for Price {
    fn default() -> Self {
        Self::usd(0)
    }
}

// ============================================================================
// PRODUCT SNAPSHOT
// ============================================================================

/// Product data copied into the cart at the time of first add.
///
/// Not re-fetched automatically: name, image and price reflect the catalog as
/// of add-time and may go stale. The backend re-validates at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product ID.
    pub id:            ProductId,
    /// Product name (cached for display).
    pub name:          String,
    /// Product SKU (cached).
    #[serde(default)]
    pub sku:           Option<String>,
    /// Primary image URL (cached).
    #[serde(default)]
    pub image_url:     Option<String>,
    /// Effective price at snapshot time (sale price when one is running).
    pub price:         Price,
    /// Pre-sale price, kept for strikethrough display.
    #[serde(default)]
    pub regular_price: Option<Price>,
}

impl ProductSnapshot {
    /// Creates a new snapshot.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id,
            name: name.into(),
            sku: None,
            image_url: None,
            price,
            regular_price: None,
        }
    }

    /// Sets the SKU.
    #[must_use]
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// Sets the primary image URL.
    #[must_use]
    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Sets the pre-sale price.
    #[must_use]
    pub fn with_regular_price(mut self, price: Price) -> Self {
        self.regular_price = Some(price);
        self
    }

    /// Whether the snapshot was taken while a sale price was running.
    #[must_use]
    pub fn is_on_sale(&self) -> bool {
        self.regular_price
            .as_ref()
            .is_some_and(|regular| self.price.amount < regular.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_normalizes_wire_forms() {
        let from_number: ProductId = serde_json::from_str("42").expect("numeric id");
        let from_string: ProductId = serde_json::from_str("\"42\"").expect("string id");

        assert_eq!(from_number, from_string);
        assert_eq!(from_number.as_str(), "42");
    }

    #[test]
    fn test_product_id_serializes_as_string() {
        let json = serde_json::to_string(&ProductId::from_numeric(7)).expect("serialize");
        assert_eq!(json, "\"7\"");
    }

    #[test]
    fn test_price_parses_decimal_strings() {
        let usd = Currency::usd;

        assert_eq!(Price::from_decimal_str("10", usd()).unwrap().amount, 1000);
        assert_eq!(Price::from_decimal_str("10.00", usd()).unwrap().amount, 1000);
        assert_eq!(Price::from_decimal_str("5.5", usd()).unwrap().amount, 550);
        assert_eq!(Price::from_decimal_str("0.99", usd()).unwrap().amount, 99);
        assert_eq!(Price::from_decimal_str(".99", usd()).unwrap().amount, 99);
        assert_eq!(Price::from_decimal_str("", usd()).unwrap().amount, 0);
        // past two decimals rounds half-up
        assert_eq!(Price::from_decimal_str("1.005", usd()).unwrap().amount, 101);
        assert_eq!(Price::from_decimal_str("1.004", usd()).unwrap().amount, 100);
    }

    #[test]
    fn test_price_rejects_garbage() {
        assert!(Price::from_decimal_str("free", Currency::usd()).is_err());
        assert!(Price::from_decimal_str("-1.00", Currency::usd()).is_err());
        assert!(Price::from_decimal_str("1.2.3", Currency::usd()).is_err());
        assert!(Price::from_decimal_str(".", Currency::usd()).is_err());
    }

    #[test]
    fn test_price_formatting() {
        let price = Price::usd(2550);
        assert_eq!(price.format(), "25.50");
        assert!((price.display_amount() - 25.5).abs() < f64::EPSILON);

        assert_eq!(Price::usd(5).format(), "0.05");
    }

    #[test]
    fn test_snapshot_sale_detection() {
        let snapshot = ProductSnapshot::new(ProductId::new("1"), "Widget", Price::usd(800))
            .with_regular_price(Price::usd(1000));

        assert!(snapshot.is_on_sale());
    }
}
