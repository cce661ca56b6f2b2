//! Pricing
//!
//! Turns a cart and an optional voucher into a [`Quote`]. Every component is
//! rounded to whole minor units before the total is summed, so the total
//! always reconciles exactly with its parts.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    money::{AmountError, apply_rate},
    vouchers::{Voucher, VoucherError},
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Nothing to price.
    #[error("cart is empty")]
    EmptyCart,

    /// A line has a quantity below one.
    #[error("line {0} has a quantity below 1")]
    InvalidQuantity(usize),

    /// A component or the total does not fit in a minor-unit amount.
    #[error("price overflowed")]
    Overflow,

    /// A rate lies outside `[0, 1]`.
    #[error("{name} rate {rate} must be between 0 and 1")]
    InvalidRate {
        /// Which rate, `shipping` or `tax`.
        name: &'static str,
        /// The rejected value.
        rate: Decimal,
    },

    /// The voucher could not be applied.
    #[error(transparent)]
    Voucher(#[from] VoucherError),
}

impl From<CartError> for PricingError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::InvalidQuantity(index) => Self::InvalidQuantity(index),
            CartError::UnknownLine(_) | CartError::Overflow => Self::Overflow,
        }
    }
}

impl From<AmountError> for PricingError {
    fn from(_error: AmountError) -> Self {
        Self::Overflow
    }
}

/// Shipping and tax rates applied to the pre-discount subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    shipping_rate: Decimal,
    tax_rate: Decimal,
}

impl PricingConfig {
    /// Default shipping rate, 15%.
    pub const DEFAULT_SHIPPING_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

    /// Default tax rate, 16%.
    pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(16, 0, 0, false, 2);

    /// Build a config from explicit rates.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::InvalidRate`] for a rate below 0 or above 1.
    pub fn new(shipping_rate: Decimal, tax_rate: Decimal) -> Result<Self, PricingError> {
        check_rate("shipping", shipping_rate)?;
        check_rate("tax", tax_rate)?;

        Ok(Self {
            shipping_rate,
            tax_rate,
        })
    }

    /// Shipping rate.
    pub fn shipping_rate(&self) -> Decimal {
        self.shipping_rate
    }

    /// Tax rate.
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            shipping_rate: Self::DEFAULT_SHIPPING_RATE,
            tax_rate: Self::DEFAULT_TAX_RATE,
        }
    }
}

fn check_rate(name: &'static str, rate: Decimal) -> Result<(), PricingError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(PricingError::InvalidRate { name, rate });
    }

    Ok(())
}

/// Priced cart, all amounts in minor units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Sum of line totals at captured unit prices.
    pub subtotal: u64,

    /// Shipping fee.
    pub shipping_fee: u64,

    /// Tax on the pre-discount subtotal.
    pub tax: u64,

    /// Voucher discount, never above the subtotal.
    pub voucher_discount: u64,

    /// Amount the customer pays.
    pub total: u64,
}

impl Quote {
    /// Whether `total == subtotal - voucher_discount + shipping_fee + tax`.
    pub fn reconciles(&self) -> bool {
        self.subtotal
            .checked_sub(self.voucher_discount)
            .and_then(|net| net.checked_add(self.shipping_fee))
            .and_then(|net| net.checked_add(self.tax))
            == Some(self.total)
    }
}

/// Price a cart.
///
/// # Errors
///
/// - [`PricingError::EmptyCart`]: the cart has no lines.
/// - [`PricingError::InvalidQuantity`]: a line has a zero quantity.
/// - [`PricingError::Voucher`]: the voucher is not eligible for this subtotal at `now`.
/// - [`PricingError::Overflow`]: an amount does not fit in a `u64`.
pub fn quote(
    cart: &Cart,
    voucher: Option<&Voucher>,
    config: &PricingConfig,
    now: Timestamp,
) -> Result<Quote, PricingError> {
    if cart.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    if let Some(index) = cart.lines().iter().position(|line| line.quantity == 0) {
        return Err(PricingError::InvalidQuantity(index));
    }

    let subtotal = cart.subtotal()?;
    let shipping_fee = apply_rate(subtotal, config.shipping_rate)?;
    let tax = apply_rate(subtotal, config.tax_rate)?;

    let voucher_discount = match voucher {
        Some(voucher) => voucher.discount_for(subtotal, now)?,
        None => 0,
    };

    let total = subtotal
        .checked_sub(voucher_discount)
        .and_then(|net| net.checked_add(shipping_fee))
        .and_then(|net| net.checked_add(tax))
        .ok_or(PricingError::Overflow)?;

    Ok(Quote {
        subtotal,
        shipping_fee,
        tax,
        voucher_discount,
        total,
    })
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{
        cart::CartLine,
        vouchers::{VoucherCode, VoucherDiscount},
    };

    use super::*;

    fn ten_thousand_cart() -> TestResult<Cart> {
        Ok(Cart::with_lines([
            CartLine::new(Uuid::now_v7(), 2, 2_500),
            CartLine::new(Uuid::now_v7(), 1, 5_000),
        ])?)
    }

    fn save10() -> TestResult<Voucher> {
        Ok(Voucher {
            code: VoucherCode::new("SAVE10")?,
            discount: VoucherDiscount::Percentage(Decimal::TEN),
            minimum_purchase_amount: Some(5_000),
            max_uses: Some(100),
            used_count: 0,
            active: true,
            starts_at: None,
            ends_at: None,
        })
    }

    #[test]
    fn default_rates_on_ten_thousand() -> TestResult {
        let quote = quote(&ten_thousand_cart()?, None, &PricingConfig::default(), Timestamp::now())?;

        assert_eq!(quote.subtotal, 10_000);
        assert_eq!(quote.shipping_fee, 1_500);
        assert_eq!(quote.tax, 1_600);
        assert_eq!(quote.voucher_discount, 0);
        assert_eq!(quote.total, 13_100);
        assert!(quote.reconciles());

        Ok(())
    }

    #[test]
    fn percentage_voucher_discounts_subtotal_only() -> TestResult {
        let voucher = save10()?;
        let quote = quote(
            &ten_thousand_cart()?,
            Some(&voucher),
            &PricingConfig::default(),
            Timestamp::now(),
        )?;

        assert_eq!(quote.voucher_discount, 1_000);
        assert_eq!(quote.tax, 1_600);
        assert_eq!(quote.total, 12_100);
        assert!(quote.reconciles());

        Ok(())
    }

    #[test]
    fn fixed_voucher_never_drops_total_below_fees() -> TestResult {
        let voucher = Voucher {
            discount: VoucherDiscount::FixedAmount(50_000),
            minimum_purchase_amount: None,
            ..save10()?
        };
        let quote = quote(
            &ten_thousand_cart()?,
            Some(&voucher),
            &PricingConfig::default(),
            Timestamp::now(),
        )?;

        assert_eq!(quote.voucher_discount, 10_000);
        assert_eq!(quote.total, quote.shipping_fee + quote.tax);

        Ok(())
    }

    #[test]
    fn ineligible_voucher_fails_the_quote() -> TestResult {
        let voucher = Voucher {
            used_count: 100,
            ..save10()?
        };
        let result = quote(
            &ten_thousand_cart()?,
            Some(&voucher),
            &PricingConfig::default(),
            Timestamp::now(),
        );

        assert_eq!(result, Err(PricingError::Voucher(VoucherError::Exhausted)));

        Ok(())
    }

    #[test]
    fn components_are_rounded_before_summing() -> TestResult {
        let cart = Cart::with_lines([CartLine::new(Uuid::now_v7(), 1, 10)])?;
        let quote = quote(&cart, None, &PricingConfig::default(), Timestamp::now())?;

        // 1.5 and 1.6 both round away from zero.
        assert_eq!(quote.shipping_fee, 2);
        assert_eq!(quote.tax, 2);
        assert_eq!(quote.total, 14);

        Ok(())
    }

    #[test]
    fn empty_cart_cannot_be_quoted() {
        assert_eq!(
            quote(&Cart::new(), None, &PricingConfig::default(), Timestamp::now()),
            Err(PricingError::EmptyCart)
        );
    }

    #[test]
    fn custom_rates_are_validated() -> TestResult {
        let config = PricingConfig::new(Decimal::ZERO, Decimal::ONE)?;

        assert_eq!(config.tax_rate(), Decimal::ONE);
        assert!(matches!(
            PricingConfig::new(Decimal::new(-1, 2), Decimal::ZERO),
            Err(PricingError::InvalidRate { name: "shipping", .. })
        ));
        assert!(matches!(
            PricingConfig::new(Decimal::ZERO, Decimal::new(101, 2)),
            Err(PricingError::InvalidRate { name: "tax", .. })
        ));

        Ok(())
    }

    #[test]
    fn reconciles_across_many_subtotals() -> TestResult {
        let voucher = Voucher {
            discount: VoucherDiscount::Percentage(Decimal::new(125, 1)),
            minimum_purchase_amount: None,
            ..save10()?
        };

        for unit_price in [1, 3, 7, 99, 1_001, 12_345, 999_999] {
            let cart = Cart::with_lines([CartLine::new(Uuid::now_v7(), 3, unit_price)])?;
            let quote = quote(&cart, Some(&voucher), &PricingConfig::default(), Timestamp::now())?;

            assert!(quote.reconciles(), "quote for {unit_price} does not reconcile");
        }

        Ok(())
    }
}
