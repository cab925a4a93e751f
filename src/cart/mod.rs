//! Cart
//!
//! [`Cart`] is the plain ordered line-item state. [`CartStore`] wraps it into a
//! shared, observable store.

use std::num::NonZeroU32;

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    pricing::{self, PricingError},
    products::{Product, ProductId},
};

mod line_item;
pub mod store;

pub use line_item::CartLineItem;
pub use store::{CartEvent, CartObserver, CartStore, Subscription};

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// The product is priced in a different currency than the cart (product id, product currency, cart currency).
    #[error("product {0} is priced in {1}, but cart uses {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),
}

/// Outcome of a single cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartChange {
    /// A product was added; `quantity` is the resulting line quantity.
    Added {
        /// Product id
        product_id: ProductId,
        /// Quantity after the add
        quantity: u32,
    },

    /// A line item's quantity was set.
    QuantityUpdated {
        /// Product id
        product_id: ProductId,
        /// New quantity
        quantity: u32,
    },

    /// A line item was removed.
    Removed {
        /// Product id
        product_id: ProductId,
    },

    /// The product was not in the cart, nothing changed.
    Unchanged {
        /// Product id
        product_id: ProductId,
    },
}

impl CartChange {
    /// Product the mutation targeted.
    pub fn product_id(&self) -> &ProductId {
        match self {
            Self::Added { product_id, .. }
            | Self::QuantityUpdated { product_id, .. }
            | Self::Removed { product_id }
            | Self::Unchanged { product_id } => product_id,
        }
    }
}

/// Cart
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    items: Vec<CartLineItem>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart priced in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Add one unit of a product.
    ///
    /// Increments the existing line item, or appends a new one with quantity 1.
    /// Stock is not checked here.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::CurrencyMismatch`] if the product is priced in a
    /// different currency; the cart is left untouched.
    pub fn add(&mut self, product: &Product) -> Result<CartChange, CartError> {
        let product_currency = product.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.id.clone(),
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        let quantity = if let Some(item) = self.find_mut(&product.id) {
            item.increment();
            item.quantity()
        } else {
            self.items.push(CartLineItem::new(product.clone()));
            1
        };

        Ok(CartChange::Added {
            product_id: product.id.clone(),
            quantity,
        })
    }

    /// Remove a line item. Unknown ids are ignored.
    pub fn remove(&mut self, product_id: &ProductId) -> CartChange {
        let before = self.items.len();

        self.items.retain(|item| item.id() != product_id);

        if self.items.len() == before {
            CartChange::Unchanged {
                product_id: product_id.clone(),
            }
        } else {
            CartChange::Removed {
                product_id: product_id.clone(),
            }
        }
    }

    /// Set a line item's quantity to exactly `quantity`.
    ///
    /// Zero or negative quantities remove the line item; quantities above
    /// `u32::MAX` are clamped. Unknown ids are ignored.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> CartChange {
        let Some(quantity) = NonZeroU32::new(clamp_quantity(quantity)) else {
            return self.remove(product_id);
        };

        match self.find_mut(product_id) {
            Some(item) => {
                item.set_quantity(quantity);

                CartChange::QuantityUpdated {
                    product_id: product_id.clone(),
                    quantity: quantity.get(),
                }
            }
            None => CartChange::Unchanged {
                product_id: product_id.clone(),
            },
        }
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Iterate over the line items.
    pub fn iter(&self) -> impl Iterator<Item = &CartLineItem> {
        self.items.iter()
    }

    /// Look up a line item by product id.
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.id() == product_id)
    }

    /// Sum of all quantities.
    pub fn item_count(&self) -> u64 {
        pricing::item_count(&self.items)
    }

    /// Sum of price × quantity over all line items.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the total overflows.
    pub fn subtotal(&self) -> Result<Money<'static, Currency>, PricingError> {
        pricing::subtotal(&self.items, self.currency)
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|item| item.id() == product_id)
    }
}

fn clamp_quantity(quantity: i64) -> u32 {
    if quantity <= 0 {
        0
    } else {
        u32::try_from(quantity).unwrap_or(u32::MAX)
    }
}
