//! Pricing Config

use clap::Args;
use rust_decimal::Decimal;
use soko::pricing::{PricingConfig, PricingError};

/// Shipping and tax rates, as fractions of the cart subtotal.
#[derive(Debug, Args)]
pub struct PricingSettings {
    /// Shipping fee rate, e.g. 0.15
    #[arg(long, env = "SHIPPING_RATE", default_value = "0.15")]
    pub shipping_rate: Decimal,

    /// Tax rate, e.g. 0.16
    #[arg(long, env = "TAX_RATE", default_value = "0.16")]
    pub tax_rate: Decimal,
}

impl PricingSettings {
    /// # Errors
    ///
    /// Returns an error if either rate lies outside `[0, 1]`.
    pub fn to_pricing_config(&self) -> Result<PricingConfig, PricingError> {
        PricingConfig::new(self.shipping_rate, self.tax_rate)
    }
}
