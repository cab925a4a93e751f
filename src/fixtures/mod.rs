//! Fixtures
//!
//! YAML product fixtures used to seed a static [`Catalog`].

use std::{fs, path::Path};

use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    products::Product,
};

pub mod products;

use products::{ProductsFixture, parse_currency, parse_price};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Price below zero
    #[error("Negative price for product: {0}")]
    NegativePrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// No currency given and no products to take it from
    #[error("No currency given and no products to infer it from")]
    NoCurrency,

    /// The products do not form a valid catalog
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Load a catalog from a YAML fixture file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or does not form a
/// valid catalog.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog, FixtureError> {
    let contents = fs::read_to_string(path)?;

    parse_catalog(&contents)
}

/// Parse a catalog from YAML fixture contents.
///
/// # Errors
///
/// Returns an error if the YAML is malformed, a price is invalid, or the
/// products do not form a valid catalog.
pub fn parse_catalog(yaml: &str) -> Result<Catalog, FixtureError> {
    let fixture: ProductsFixture = serde_norway::from_str(yaml)?;

    let currency = match (&fixture.currency, fixture.products.first()) {
        (Some(code), _) => parse_currency(code)?,
        (None, Some(first)) => parse_price(&first.price)?.1,
        (None, None) => return Err(FixtureError::NoCurrency),
    };

    let products = fixture
        .products
        .into_iter()
        .map(Product::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Catalog::new(currency, products)?)
}
