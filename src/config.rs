//! Storefront configuration module

use std::path::PathBuf;

use clap::Parser;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{fixtures::products::decimal_to_minor, summary::ShippingPolicy};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command line or environment could not be parsed
    #[error(transparent)]
    Args(#[from] clap::Error),

    /// A shipping amount is negative, too large or finer than the currency's minor unit
    #[error("invalid shipping amount: {0}")]
    InvalidAmount(Decimal),
}

/// Shared storefront settings
#[derive(Debug, Clone, clap::Args)]
pub struct StorefrontConfig {
    /// Product catalog fixture (YAML)
    #[arg(
        long,
        env = "ARTISAN_CATALOG",
        default_value = "fixtures/products/artisan.yml"
    )]
    pub catalog: PathBuf,

    /// Subtotal above which shipping is free
    #[arg(long, env = "ARTISAN_FREE_SHIPPING_OVER", default_value = "100.00")]
    pub free_shipping_over: Decimal,

    /// Flat shipping charge below the free shipping threshold
    #[arg(long, env = "ARTISAN_FLAT_SHIPPING", default_value = "10.00")]
    pub flat_shipping: Decimal,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}

impl StorefrontConfig {
    /// Build the shipping policy in the catalog currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAmount`] for negative, sub-unit or
    /// unrepresentable amounts.
    pub fn shipping_policy(
        &self,
        currency: &'static Currency,
    ) -> Result<ShippingPolicy, ConfigError> {
        Ok(ShippingPolicy::new(
            money(self.free_shipping_over, currency)?,
            money(self.flat_shipping, currency)?,
        ))
    }
}

fn money(amount: Decimal, currency: &'static Currency) -> Result<Money<'static, Currency>, ConfigError> {
    decimal_to_minor(amount, currency)
        .filter(|minor| *minor >= 0)
        .map(|minor| Money::from_minor(minor, currency))
        .ok_or(ConfigError::InvalidAmount(amount))
}

/// Parse configuration from `.env`, the environment and CLI arguments.
///
/// # Errors
///
/// Returns an error if configuration cannot be parsed
pub fn load<P: Parser>() -> Result<P, ConfigError> {
    // Load .env file if present (ignore if missing)
    _ = dotenvy::dotenv();

    Ok(P::try_parse()?)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        config: StorefrontConfig,
    }

    #[test]
    fn defaults_match_standard_policy() -> TestResult {
        let cli = TestCli::try_parse_from(["artisan"])?;

        assert_eq!(
            cli.config.shipping_policy(USD)?,
            ShippingPolicy::standard(USD)
        );

        Ok(())
    }

    #[test]
    fn shipping_amounts_can_be_overridden() -> TestResult {
        let cli = TestCli::try_parse_from([
            "artisan",
            "--free-shipping-over",
            "50",
            "--flat-shipping",
            "4.99",
        ])?;

        let policy = cli.config.shipping_policy(USD)?;

        assert_eq!(policy.free_over(), &Money::from_minor(5_000, USD));
        assert_eq!(policy.flat_rate(), &Money::from_minor(499, USD));

        Ok(())
    }

    #[test]
    fn negative_amounts_are_rejected() -> TestResult {
        let cli = TestCli::try_parse_from(["artisan", "--flat-shipping=-1"])?;

        assert!(matches!(
            cli.config.shipping_policy(USD),
            Err(ConfigError::InvalidAmount(_))
        ));

        Ok(())
    }

    #[test]
    fn sub_cent_amounts_are_rejected() -> TestResult {
        let cli = TestCli::try_parse_from(["artisan", "--free-shipping-over", "99.995"])?;

        assert!(matches!(
            cli.config.shipping_policy(USD),
            Err(ConfigError::InvalidAmount(_))
        ));

        Ok(())
    }
}
