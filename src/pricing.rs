//! Pricing
//!
//! Derived cart values computed from a slice of line items. Every consumer
//! goes through these functions so they all agree on the same arithmetic.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::cart::CartLineItem;

/// Errors that can occur while totalling line items.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// A line item is priced in a different currency (item currency, expected currency).
    #[error("line item priced in {0}, expected {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The total does not fit in minor units.
    #[error("total overflows minor units")]
    Overflow,
}

/// Price × quantity for one line item, in minor units.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product does not fit in minor units.
pub fn line_total_minor(item: &CartLineItem) -> Result<i64, PricingError> {
    item.price()
        .to_minor_units()
        .checked_mul(i64::from(item.quantity()))
        .ok_or(PricingError::Overflow)
}

/// Sum of quantities across all line items.
pub fn item_count(items: &[CartLineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity())).sum()
}

/// Sum of price × quantity across all line items, in the given currency.
///
/// An empty slice totals zero.
///
/// # Errors
///
/// - [`PricingError::CurrencyMismatch`]: an item is priced in another currency.
/// - [`PricingError::Overflow`]: the total does not fit in minor units.
pub fn subtotal(
    items: &[CartLineItem],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    let total = items.iter().try_fold(0_i64, |acc, item| {
        let item_currency = item.price().currency();

        if item_currency != currency {
            return Err(PricingError::CurrencyMismatch(
                item_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        acc.checked_add(line_total_minor(item)?)
            .ok_or(PricingError::Overflow)
    })?;

    Ok(Money::from_minor(total, currency))
}
