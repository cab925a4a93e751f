//! Storefront
//!
//! Composition root: owns the product source, the cart store and the shipping
//! policy, and applies the checks a page makes before touching the cart.

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cart::{CartChange, CartError, CartStore},
    catalog::{CatalogError, ProductFilter, ProductSource},
    pricing::PricingError,
    products::{Product, ProductId},
    summary::{OrderSummary, ShippingPolicy},
};

/// Number of products shown on the home page.
pub const FEATURED_LIMIT: usize = 3;

/// Storefront errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorefrontError {
    /// Product lookup failed
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The product cannot be bought right now
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// The cart refused the product
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Totals could not be computed
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Storefront
#[derive(Debug)]
pub struct Storefront<S> {
    source: S,
    cart: CartStore,
    shipping: ShippingPolicy,
}

impl<S: ProductSource> Storefront<S> {
    /// Create a storefront around a product source and an empty cart.
    pub fn new(source: S, cart: CartStore, shipping: ShippingPolicy) -> Self {
        Self {
            source,
            cart,
            shipping,
        }
    }

    /// Products matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Catalog`] if the source fails.
    pub fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>, StorefrontError> {
        Ok(self.source.list(filter)?)
    }

    /// Home page selection: the newest in-stock products, at most
    /// [`FEATURED_LIMIT`] of them.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Catalog`] if the source fails.
    pub fn featured(&self) -> Result<Vec<Product>, StorefrontError> {
        let filter = ProductFilter::all().in_stock(true).limit(FEATURED_LIMIT);

        Ok(self.source.list(&filter)?)
    }

    /// Distinct categories of all listed products, in listing order.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Catalog`] if the source fails.
    pub fn categories(&self) -> Result<Vec<String>, StorefrontError> {
        let mut categories: Vec<String> = Vec::new();

        for product in self.source.list(&ProductFilter::all())? {
            if !categories.contains(&product.category) {
                categories.push(product.category);
            }
        }

        Ok(categories)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] (wrapped) for unknown ids.
    pub fn product(&self, id: &ProductId) -> Result<Product, StorefrontError> {
        Ok(self.source.get(id)?)
    }

    /// Look a product up and add one unit of it to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist, is out of stock, or is
    /// priced in another currency than the cart.
    pub fn add_to_cart(&self, id: &ProductId) -> Result<CartChange, StorefrontError> {
        let product = self.source.get(id)?;

        if !product.in_stock {
            warn!(product_id = %id, "refusing to add out-of-stock product");

            return Err(StorefrontError::OutOfStock(product.id));
        }

        let change = self.cart.add_item(&product)?;

        info!(product_id = %id, item_count = self.cart.item_count(), "added to cart");

        Ok(change)
    }

    /// The shared cart handle.
    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    /// Shipping policy in use.
    pub fn shipping(&self) -> &ShippingPolicy {
        &self.shipping
    }

    /// Summary of the current cart.
    ///
    /// # Errors
    ///
    /// Returns a [`StorefrontError::Pricing`] if the totals cannot be computed.
    pub fn summary(&self) -> Result<OrderSummary, StorefrontError> {
        Ok(self.cart.summary(&self.shipping)?)
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::catalog::MockProductSource;

    use super::*;

    fn lamp() -> Product {
        Product::new("3", "Brass Table Lamp", Money::from_minor(15_900, USD)).with_category("Lighting")
    }

    fn storefront(source: MockProductSource) -> Storefront<MockProductSource> {
        Storefront::new(source, CartStore::new(USD), ShippingPolicy::standard(USD))
    }

    #[test]
    fn add_to_cart_fetches_and_adds() -> TestResult {
        let mut source = MockProductSource::new();
        source
            .expect_get()
            .with(eq(ProductId::new("3")))
            .times(2)
            .returning(|_| Ok(lamp()));

        let storefront = storefront(source);

        storefront.add_to_cart(&ProductId::new("3"))?;
        let change = storefront.add_to_cart(&ProductId::new("3"))?;

        assert!(matches!(change, CartChange::Added { quantity: 2, .. }));
        assert_eq!(storefront.cart().item_count(), 2);
        assert_eq!(storefront.summary()?.total(), Money::from_minor(31_800, USD));

        Ok(())
    }

    #[test]
    fn add_to_cart_refuses_out_of_stock() {
        let mut source = MockProductSource::new();
        source
            .expect_get()
            .returning(|_| Ok(lamp().with_in_stock(false)));

        let storefront = storefront(source);

        let result = storefront.add_to_cart(&ProductId::new("3"));

        assert_eq!(result, Err(StorefrontError::OutOfStock(ProductId::new("3"))));
        assert!(storefront.cart().is_empty());
    }

    #[test]
    fn add_to_cart_reports_unknown_product() {
        let mut source = MockProductSource::new();
        source
            .expect_get()
            .returning(|id| Err(CatalogError::NotFound(id.clone())));

        let storefront = storefront(source);

        let result = storefront.add_to_cart(&ProductId::new("404"));

        assert_eq!(
            result,
            Err(StorefrontError::Catalog(CatalogError::NotFound(
                ProductId::new("404")
            )))
        );
        assert_eq!(storefront.cart().revision(), 0);
    }

    #[test]
    fn featured_asks_for_in_stock_products_with_limit() -> TestResult {
        let mut source = MockProductSource::new();
        source
            .expect_list()
            .with(eq(ProductFilter {
                category: None,
                in_stock: Some(true),
                limit: Some(FEATURED_LIMIT),
            }))
            .times(1)
            .returning(|_| Ok(vec![lamp()]));

        let storefront = storefront(source);

        assert_eq!(storefront.featured()?, [lamp()]);

        Ok(())
    }

    #[test]
    fn categories_are_distinct() -> TestResult {
        let mut source = MockProductSource::new();
        source.expect_list().returning(|_| {
            Ok(vec![
                lamp(),
                lamp().with_category("Textiles"),
                lamp(),
            ])
        });

        let storefront = storefront(source);

        assert_eq!(storefront.categories()?, ["Lighting", "Textiles"]);

        Ok(())
    }
}
