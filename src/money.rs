//! Money

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso};
use thiserror::Error;

/// Currency every storefront amount is denominated in.
pub const STORE_CURRENCY: &iso::Currency = iso::KES;

/// Errors raised by minor-unit arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    /// The result does not fit in a minor-unit amount.
    #[error("amount overflowed")]
    Overflow,

    /// The multiplier was negative.
    #[error("rate must not be negative")]
    NegativeRate,
}

/// Multiply `amount` by `rate` and round half away from zero to whole minor units.
///
/// # Errors
///
/// - [`AmountError::NegativeRate`]: `rate` is below zero.
/// - [`AmountError::Overflow`]: the rounded product does not fit in a `u64`.
pub fn apply_rate(amount: u64, rate: Decimal) -> Result<u64, AmountError> {
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(AmountError::NegativeRate);
    }

    let Some(amount) = Decimal::from_u64(amount) else {
        return Err(AmountError::Overflow);
    };

    amount
        .checked_mul(rate)
        .map(|applied| applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_u64())
        .ok_or(AmountError::Overflow)
}

/// Render a minor-unit amount for customer-facing text, e.g. `KSh13,100.00`.
///
/// # Errors
///
/// Returns [`AmountError::Overflow`] when the amount cannot be represented as signed minor units.
pub fn format_amount(minor: u64, currency: &'static iso::Currency) -> Result<String, AmountError> {
    let minor = i64::try_from(minor).map_err(|_overflow| AmountError::Overflow)?;

    Ok(Money::from_minor(minor, currency).to_string())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn apply_rate_rounds_half_away_from_zero() -> TestResult {
        assert_eq!(apply_rate(10, Decimal::new(15, 2))?, 2);
        assert_eq!(apply_rate(10, Decimal::new(25, 2))?, 3);
        assert_eq!(apply_rate(10_000, Decimal::new(16, 2))?, 1_600);

        Ok(())
    }

    #[test]
    fn apply_rate_zero_rate_is_zero() -> TestResult {
        assert_eq!(apply_rate(123_456, Decimal::ZERO)?, 0);

        Ok(())
    }

    #[test]
    fn apply_rate_rejects_negative_rate() {
        assert_eq!(
            apply_rate(100, Decimal::new(-1, 2)),
            Err(AmountError::NegativeRate)
        );
    }

    #[test]
    fn apply_rate_reports_overflow() {
        assert_eq!(apply_rate(u64::MAX, Decimal::TWO), Err(AmountError::Overflow));
    }

    #[test]
    fn format_amount_uses_store_currency() -> TestResult {
        let formatted = format_amount(1_310_000, STORE_CURRENCY)?;

        assert!(
            formatted.contains("13,100"),
            "expected grouped shillings, got {formatted}"
        );

        Ok(())
    }
}
