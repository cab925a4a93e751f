//! Product Fixtures

use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::{Product, ProductId},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Catalog currency code; taken from the first product when omitted
    #[serde(default)]
    pub currency: Option<String>,

    /// Products in catalog order
    pub products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product id
    pub id: String,

    /// Product name
    pub name: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Product price (e.g., "89.00 USD")
    pub price: String,

    /// Display image reference
    #[serde(default)]
    pub image_url: String,

    /// Product category
    pub category: String,

    /// Availability flag
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,

    /// Creation timestamp (RFC 3339)
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

fn default_in_stock() -> bool {
    true
}

impl TryFrom<ProductFixture> for Product {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        if minor_units < 0 {
            return Err(FixtureError::NegativePrice(fixture.id));
        }

        Ok(Product {
            id: ProductId::new(fixture.id),
            name: fixture.name,
            description: fixture.description,
            price: Money::from_minor(minor_units, currency),
            image_url: fixture.image_url,
            category: fixture.category,
            in_stock: fixture.in_stock,
            created_at: fixture.created_at,
        })
    }
}

/// Look up a supported ISO currency by code.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for anything other than GBP, USD or EUR.
pub fn parse_currency(code: &str) -> Result<&'static Currency, FixtureError> {
    match code.trim() {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}

/// Convert a decimal amount into the currency's minor units.
///
/// Returns `None` if the amount is more precise than the currency allows
/// (e.g. `89.005` in USD) or does not fit in an `i64`.
pub fn decimal_to_minor(amount: Decimal, currency: &Currency) -> Option<i64> {
    let amount = amount.normalize();

    if amount.scale() > currency.exponent {
        return None;
    }

    let factor = 10_i64.checked_pow(currency.exponent)?;

    amount
        .checked_mul(Decimal::from(factor))
        .and_then(|value| value.to_i64())
}

/// Parse price string (e.g., "89.00 USD") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a decimal number or has more decimal places than the
/// currency, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let currency = parse_currency(currency_code)?;

    let minor_units = amount
        .parse::<Decimal>()
        .ok()
        .and_then(|amount| decimal_to_minor(amount, currency))
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}
