//! Catalog
//!
//! The product record source: a [`ProductSource`] trait for anything that can
//! list and fetch products, and [`Catalog`], a static in-memory implementation.

use std::cmp::Reverse;

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::info;

use crate::products::{Product, ProductId};

new_key_type! {
    /// Catalog Key
    pub struct CatalogKey;
}

/// Catalog errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No product with this id
    #[error("product not found: {0}")]
    NotFound(ProductId),

    /// Two products share an id
    #[error("duplicate product id: {0}")]
    DuplicateProduct(ProductId),

    /// A product has an empty id
    #[error("product {0:?} has an empty id")]
    EmptyId(String),

    /// A product is priced in a different currency than the catalog (product id, product currency, catalog currency)
    #[error("product {0} is priced in {1}, but catalog uses {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),
}

/// Equality filters applied when listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Only products in this category
    pub category: Option<String>,

    /// Only products with this availability
    pub in_stock: Option<bool>,

    /// At most this many products, taken after ordering
    pub limit: Option<usize>,
}

impl ProductFilter {
    /// A filter that matches everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restrict to one category.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Restrict to products with the given availability.
    #[must_use]
    pub fn in_stock(mut self, in_stock: bool) -> Self {
        self.in_stock = Some(in_stock);
        self
    }

    /// Return at most `limit` products.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check a product against the equality filters. `limit` is applied by
    /// the source after ordering.
    pub fn matches(&self, product: &Product) -> bool {
        self.category
            .as_deref()
            .is_none_or(|category| product.category == category)
            && self
                .in_stock
                .is_none_or(|in_stock| product.in_stock == in_stock)
    }
}

/// Anything that can supply product snapshots.
#[cfg_attr(test, mockall::automock)]
pub trait ProductSource {
    /// Products matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if the source cannot be queried.
    fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError>;

    /// A single product by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if there is no such product.
    fn get(&self, id: &ProductId) -> Result<Product, CatalogError>;
}

/// Static in-memory catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: SlotMap<CatalogKey, Product>,
    keys: FxHashMap<ProductId, CatalogKey>,
    currency: &'static Currency,
}

impl Catalog {
    /// Build a catalog from products, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if an id is empty or repeated, or a product
    /// is priced in another currency.
    pub fn new(
        currency: &'static Currency,
        products: impl IntoIterator<Item = Product>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            products: SlotMap::with_key(),
            keys: FxHashMap::default(),
            currency,
        };

        for product in products {
            catalog.insert(product)?;
        }

        info!(
            products = catalog.len(),
            currency = currency.iso_alpha_code,
            "catalog loaded"
        );

        Ok(catalog)
    }

    fn insert(&mut self, product: Product) -> Result<CatalogKey, CatalogError> {
        if product.id.is_blank() {
            return Err(CatalogError::EmptyId(product.name));
        }

        if self.keys.contains_key(&product.id) {
            return Err(CatalogError::DuplicateProduct(product.id));
        }

        let product_currency = product.currency();

        if product_currency != self.currency {
            return Err(CatalogError::CurrencyMismatch(
                product.id,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let id = product.id.clone();
        let key = self.products.insert(product);

        self.keys.insert(id, key);

        Ok(key)
    }

    /// Currency every product is priced in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl ProductSource for Catalog {
    fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, CatalogError> {
        let mut products: Vec<Product> = self
            .products
            .values()
            .filter(|product| filter.matches(product))
            .cloned()
            .collect();

        // Stable: undated products and ties keep catalog order, after dated ones.
        products.sort_by_key(|product| {
            (
                product.created_at.is_none(),
                Reverse(product.created_at),
            )
        });

        if let Some(limit) = filter.limit {
            products.truncate(limit);
        }

        Ok(products)
    }

    fn get(&self, id: &ProductId) -> Result<Product, CatalogError> {
        self.keys
            .get(id)
            .and_then(|key| self.products.get(*key))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rusty_money::{
        Money,
        iso::{EUR, USD},
    };
    use testresult::TestResult;

    use super::*;

    fn product(id: &str, category: &str) -> Product {
        Product::new(id, format!("Product {id}"), Money::from_minor(1_000, USD)).with_category(category)
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|product| product.id.as_str()).collect()
    }

    #[test]
    fn list_keeps_catalog_order_without_timestamps() -> TestResult {
        let catalog = Catalog::new(USD, [product("1", "Lighting"), product("2", "Textiles")])?;

        assert_eq!(ids(&catalog.list(&ProductFilter::all())?), ["1", "2"]);

        Ok(())
    }

    #[test]
    fn list_orders_newest_first() -> TestResult {
        let older: Timestamp = "2025-01-01T00:00:00Z".parse()?;
        let newer: Timestamp = "2025-02-01T00:00:00Z".parse()?;

        let catalog = Catalog::new(
            USD,
            [
                product("undated", "Lighting"),
                product("old", "Lighting").with_created_at(older),
                product("new", "Lighting").with_created_at(newer),
            ],
        )?;

        assert_eq!(
            ids(&catalog.list(&ProductFilter::all())?),
            ["new", "old", "undated"]
        );

        Ok(())
    }

    #[test]
    fn list_filters_by_category_and_stock() -> TestResult {
        let catalog = Catalog::new(
            USD,
            [
                product("1", "Lighting"),
                product("2", "Lighting").with_in_stock(false),
                product("3", "Textiles"),
            ],
        )?;

        let lighting = catalog.list(&ProductFilter::all().category("Lighting"))?;
        let available = catalog.list(&ProductFilter::all().category("Lighting").in_stock(true))?;
        let none = catalog.list(&ProductFilter::all().category("Garden"))?;

        assert_eq!(ids(&lighting), ["1", "2"]);
        assert_eq!(ids(&available), ["1"]);
        assert!(none.is_empty());

        Ok(())
    }

    #[test]
    fn list_limit_applies_after_ordering() -> TestResult {
        let day = |d: u8| -> Result<Timestamp, jiff::Error> {
            format!("2025-01-{d:02}T00:00:00Z").parse()
        };

        let catalog = Catalog::new(
            USD,
            [
                product("1", "Lighting").with_created_at(day(1)?),
                product("2", "Lighting").with_created_at(day(2)?).with_in_stock(false),
                product("3", "Lighting").with_created_at(day(3)?),
                product("4", "Lighting").with_created_at(day(4)?),
                product("5", "Lighting").with_created_at(day(5)?),
            ],
        )?;

        let newest = catalog.list(&ProductFilter::all().limit(2))?;
        let featured = catalog.list(&ProductFilter::all().in_stock(true).limit(3))?;
        let unlimited = catalog.list(&ProductFilter::all().limit(10))?;
        let nothing = catalog.list(&ProductFilter::all().limit(0))?;

        assert_eq!(ids(&newest), ["5", "4"]);
        assert_eq!(ids(&featured), ["5", "4", "3"]);
        assert_eq!(unlimited.len(), 5);
        assert!(nothing.is_empty());

        Ok(())
    }

    #[test]
    fn get_returns_product_or_not_found() -> TestResult {
        let catalog = Catalog::new(USD, [product("1", "Lighting")])?;

        assert_eq!(catalog.get(&ProductId::new("1"))?.name, "Product 1");
        assert_eq!(
            catalog.get(&ProductId::new("9")),
            Err(CatalogError::NotFound(ProductId::new("9")))
        );

        Ok(())
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Catalog::new(USD, [product("1", "Lighting"), product("1", "Textiles")]);

        assert!(matches!(result, Err(CatalogError::DuplicateProduct(id)) if id.as_str() == "1"));
    }

    #[test]
    fn empty_ids_are_rejected() {
        let result = Catalog::new(USD, [product(" ", "Lighting")]);

        assert!(matches!(result, Err(CatalogError::EmptyId(_))));
    }

    #[test]
    fn foreign_currency_is_rejected() {
        let euro = Product::new("1", "Vase", Money::from_minor(100, EUR));

        let result = Catalog::new(USD, [euro]);

        assert!(matches!(result, Err(CatalogError::CurrencyMismatch(..))));
    }
}
