//! Order Summary
//!
//! Shipping and totals for a cart, plus a table rendering of it for the
//! terminal.

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::CartLineItem,
    pricing::{self, PricingError},
};

/// Errors that can occur while rendering a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Writing to the output failed
    #[error("failed to write summary: {0}")]
    Io(#[from] io::Error),

    /// Totalling the line items failed
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Shipping charge rule: a flat rate, waived above a subtotal threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy {
    free_over: Money<'static, Currency>,
    flat_rate: Money<'static, Currency>,
}

impl ShippingPolicy {
    /// Create a policy. Shipping is free once the subtotal is strictly greater
    /// than `free_over`, otherwise `flat_rate` is charged.
    pub fn new(free_over: Money<'static, Currency>, flat_rate: Money<'static, Currency>) -> Self {
        Self {
            free_over,
            flat_rate,
        }
    }

    /// The store's standard policy: free over 100.00, otherwise 10.00.
    pub fn standard(currency: &'static Currency) -> Self {
        Self::new(
            Money::from_minor(10_000, currency),
            Money::from_minor(1_000, currency),
        )
    }

    /// Threshold above which shipping is free
    pub fn free_over(&self) -> &Money<'static, Currency> {
        &self.free_over
    }

    /// Charge applied at or below the threshold
    pub fn flat_rate(&self) -> &Money<'static, Currency> {
        &self.flat_rate
    }

    /// Shipping charge for a subtotal. An empty cart ships for free.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] if the subtotal or the flat
    /// rate use a different currency than the threshold.
    pub fn shipping_for(
        &self,
        subtotal: &Money<'static, Currency>,
        item_count: u64,
    ) -> Result<Money<'static, Currency>, PricingError> {
        let currency = self.free_over.currency();

        for money in [subtotal, &self.flat_rate] {
            if money.currency() != currency {
                return Err(PricingError::CurrencyMismatch(
                    money.currency().iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }
        }

        if item_count == 0 || subtotal.to_minor_units() > self.free_over.to_minor_units() {
            Ok(Money::from_minor(0, currency))
        } else {
            Ok(self.flat_rate)
        }
    }
}

/// Subtotal, shipping and total for a set of line items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSummary {
    item_count: u64,
    subtotal: Money<'static, Currency>,
    shipping: Money<'static, Currency>,
    total: Money<'static, Currency>,
}

impl OrderSummary {
    /// Build the summary for the given line items.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] on overflow or if the policy is priced in
    /// another currency.
    pub fn from_items(
        items: &[CartLineItem],
        currency: &'static Currency,
        policy: &ShippingPolicy,
    ) -> Result<Self, PricingError> {
        let item_count = pricing::item_count(items);
        let subtotal = pricing::subtotal(items, currency)?;
        let shipping = policy.shipping_for(&subtotal, item_count)?;

        let total = subtotal
            .to_minor_units()
            .checked_add(shipping.to_minor_units())
            .ok_or(PricingError::Overflow)?;

        Ok(Self {
            item_count,
            subtotal,
            shipping,
            total: Money::from_minor(total, currency),
        })
    }

    /// Sum of quantities
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Total before shipping
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Shipping charge
    pub fn shipping(&self) -> Money<'static, Currency> {
        self.shipping
    }

    /// Amount payable
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Whether shipping was waived
    pub fn free_shipping(&self) -> bool {
        self.shipping.to_minor_units() == 0
    }

    /// Prints the line items and totals as a table.
    ///
    /// # Errors
    ///
    /// Returns an error if a line total overflows or the output cannot be written.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        items: &[CartLineItem],
    ) -> Result<(), SummaryError> {
        if items.is_empty() {
            writeln!(out, "\nYour cart is empty")?;

            return Ok(());
        }

        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Category", "Price", "Qty", "Line Total"]);

        for (idx, item) in items.iter().enumerate() {
            let line_total = Money::from_minor(pricing::line_total_minor(item)?, item.price().currency());

            builder.push_record([
                format!("#{}", idx + 1),
                item.product().name.clone(),
                item.product().category.clone(),
                item.price().to_string(),
                item.quantity().to_string(),
                line_total.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..6), Alignment::right());

        writeln!(out, "\n{table}")?;

        let shipping = if self.free_shipping() {
            "Free".to_string()
        } else {
            self.shipping.to_string()
        };

        let lines = [
            (" Items:", self.item_count.to_string()),
            (" Subtotal:", self.subtotal.to_string()),
            (" Shipping:", shipping),
            (" Total:", self.total.to_string()),
        ];

        let label_width = lines.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = lines.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in lines {
            writeln!(out, "{label:<label_width$} {value:>value_width$}")?;
        }

        Ok(())
    }
}
