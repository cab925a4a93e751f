//! Cart line items

use std::num::NonZeroU32;

use rusty_money::{Money, iso::Currency};

use crate::products::{Product, ProductId};

/// One product in the cart together with the quantity requested.
///
/// Holds a copy of the product taken when it was first added.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    product: Product,
    quantity: NonZeroU32,
}

impl CartLineItem {
    /// New line item with a quantity of one.
    pub fn new(product: Product) -> Self {
        Self::with_quantity(product, NonZeroU32::MIN)
    }

    /// New line item with the given quantity.
    pub fn with_quantity(product: Product, quantity: NonZeroU32) -> Self {
        Self { product, quantity }
    }

    /// Product snapshot
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Product id
    pub fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// Unit price at the time the product was added
    pub fn price(&self) -> &Money<'static, Currency> {
        &self.product.price
    }

    /// Quantity, always at least one
    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    pub(crate) fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    pub(crate) fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }
}
