//! Vouchers

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::money::{AmountError, apply_rate};

/// Reasons a voucher cannot be applied to a cart.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoucherError {
    /// No voucher exists with the submitted code.
    #[error("voucher code not recognised")]
    UnknownCode,

    /// The submitted code was empty after trimming.
    #[error("voucher code is blank")]
    BlankCode,

    /// The voucher has been switched off.
    #[error("voucher is not active")]
    Inactive,

    /// The voucher's validity window has not opened yet.
    #[error("voucher is not valid yet")]
    NotYetValid,

    /// The voucher's validity window has closed.
    #[error("voucher has expired")]
    Expired,

    /// Cart subtotal is below the voucher's minimum purchase amount.
    #[error("voucher requires a minimum purchase of {minimum}, cart subtotal is {subtotal}")]
    BelowMinimumPurchase {
        /// Smallest qualifying subtotal.
        minimum: u64,
        /// Subtotal of the cart.
        subtotal: u64,
    },

    /// Every permitted use of the voucher has been consumed.
    #[error("voucher has no uses left")]
    Exhausted,

    /// Percentage discounts must lie in (0, 100].
    #[error("percentage discount must be above 0 and at most 100")]
    InvalidPercentage,

    /// Fixed discounts must be above zero.
    #[error("fixed discount must be above 0")]
    InvalidAmount,

    /// Discount arithmetic overflowed.
    #[error("voucher discount overflowed")]
    Overflow,
}

impl VoucherError {
    /// Whether this failure is caused by an exhausted shared counter rather than bad input.
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

impl From<AmountError> for VoucherError {
    fn from(_error: AmountError) -> Self {
        Self::Overflow
    }
}

/// Case-normalized voucher code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoucherCode(String);

impl VoucherCode {
    /// Normalize a raw code: surrounding whitespace is dropped and letters are upper-cased.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::BlankCode`] when nothing remains after trimming.
    pub fn new(raw: &str) -> Result<Self, VoucherError> {
        let code = raw.trim();

        if code.is_empty() {
            return Err(VoucherError::BlankCode);
        }

        Ok(Self(code.to_uppercase()))
    }

    /// The normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoucherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VoucherCode {
    type Err = VoucherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for VoucherCode {
    type Error = VoucherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<VoucherCode> for String {
    fn from(code: VoucherCode) -> Self {
        code.0
    }
}

/// How a voucher reduces the subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum VoucherDiscount {
    /// Percentage of the subtotal, e.g. `10` for ten percent.
    Percentage(Decimal),

    /// Fixed amount in minor units, capped at the subtotal.
    FixedAmount(u64),
}

impl VoucherDiscount {
    /// Storage name of the discount kind.
    pub const fn type_as_str(&self) -> &'static str {
        match self {
            Self::Percentage(_) => "percentage",
            Self::FixedAmount(_) => "fixed_amount",
        }
    }

    /// Check the discount value is within range.
    ///
    /// # Errors
    ///
    /// - [`VoucherError::InvalidPercentage`]: percentage outside (0, 100].
    /// - [`VoucherError::InvalidAmount`]: fixed amount of zero.
    pub fn validate(&self) -> Result<(), VoucherError> {
        match self {
            Self::Percentage(percent) => {
                if *percent <= Decimal::ZERO || *percent > Decimal::ONE_HUNDRED {
                    return Err(VoucherError::InvalidPercentage);
                }
            }
            Self::FixedAmount(0) => return Err(VoucherError::InvalidAmount),
            Self::FixedAmount(_) => {}
        }

        Ok(())
    }

    /// Discount for `subtotal`, never more than the subtotal itself.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::Overflow`] if the percentage cannot be applied.
    pub fn amount_off(&self, subtotal: u64) -> Result<u64, VoucherError> {
        let discount = match self {
            Self::Percentage(percent) => apply_rate(subtotal, *percent / Decimal::ONE_HUNDRED)?,
            Self::FixedAmount(value) => *value,
        };

        Ok(discount.min(subtotal))
    }
}

/// A discount code with usage and eligibility constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voucher {
    /// Normalized code customers type in.
    pub code: VoucherCode,

    /// Discount granted.
    pub discount: VoucherDiscount,

    /// Smallest subtotal the voucher applies to.
    pub minimum_purchase_amount: Option<u64>,

    /// Maximum number of redemptions, unlimited when `None`.
    pub max_uses: Option<u32>,

    /// Redemptions so far.
    pub used_count: u32,

    /// Whether the voucher is switched on.
    pub active: bool,

    /// Start of the validity window, inclusive.
    pub starts_at: Option<Timestamp>,

    /// End of the validity window, exclusive.
    pub ends_at: Option<Timestamp>,
}

impl Voucher {
    /// Redemptions left, `None` when unlimited.
    pub fn remaining_uses(&self) -> Option<u32> {
        self.max_uses
            .map(|max_uses| max_uses.saturating_sub(self.used_count))
    }

    /// Check the voucher may be applied to a cart with `subtotal` at `now`.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule, checked in this order: active flag, window start,
    /// window end, minimum purchase, remaining uses.
    pub fn check_eligibility(&self, subtotal: u64, now: Timestamp) -> Result<(), VoucherError> {
        if !self.active {
            return Err(VoucherError::Inactive);
        }

        if self.starts_at.is_some_and(|starts_at| now < starts_at) {
            return Err(VoucherError::NotYetValid);
        }

        if self.ends_at.is_some_and(|ends_at| now >= ends_at) {
            return Err(VoucherError::Expired);
        }

        if let Some(minimum) = self.minimum_purchase_amount
            && subtotal < minimum
        {
            return Err(VoucherError::BelowMinimumPurchase { minimum, subtotal });
        }

        if self.remaining_uses() == Some(0) {
            return Err(VoucherError::Exhausted);
        }

        Ok(())
    }

    /// Eligibility check followed by the discount amount.
    ///
    /// # Errors
    ///
    /// See [`Voucher::check_eligibility`] and [`VoucherDiscount::amount_off`].
    pub fn discount_for(&self, subtotal: u64, now: Timestamp) -> Result<u64, VoucherError> {
        self.check_eligibility(subtotal, now)?;

        self.discount.amount_off(subtotal)
    }
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use super::*;

    fn percentage_voucher(percent: i64) -> TestResult<Voucher> {
        Ok(Voucher {
            code: VoucherCode::new("save10")?,
            discount: VoucherDiscount::Percentage(Decimal::from(percent)),
            minimum_purchase_amount: Some(5_000),
            max_uses: Some(10),
            used_count: 0,
            active: true,
            starts_at: None,
            ends_at: None,
        })
    }

    #[test]
    fn code_is_trimmed_and_uppercased() -> TestResult {
        let code = VoucherCode::new("  save10 ")?;

        assert_eq!(code.as_str(), "SAVE10");
        assert_eq!(VoucherCode::new("   "), Err(VoucherError::BlankCode));

        Ok(())
    }

    #[test]
    fn percentage_discount_of_subtotal() -> TestResult {
        let voucher = percentage_voucher(10)?;

        assert_eq!(voucher.discount_for(10_000, Timestamp::now())?, 1_000);

        Ok(())
    }

    #[test]
    fn fixed_discount_is_capped_at_subtotal() -> TestResult {
        let voucher = Voucher {
            discount: VoucherDiscount::FixedAmount(8_000),
            minimum_purchase_amount: None,
            ..percentage_voucher(10)?
        };

        assert_eq!(voucher.discount_for(5_000, Timestamp::now())?, 5_000);
        assert_eq!(voucher.discount_for(9_000, Timestamp::now())?, 8_000);

        Ok(())
    }

    #[test]
    fn below_minimum_purchase_is_rejected() -> TestResult {
        let voucher = percentage_voucher(10)?;

        assert_eq!(
            voucher.discount_for(4_999, Timestamp::now()),
            Err(VoucherError::BelowMinimumPurchase {
                minimum: 5_000,
                subtotal: 4_999
            })
        );

        Ok(())
    }

    #[test]
    fn exhausted_voucher_is_a_capacity_failure() -> TestResult {
        let voucher = Voucher {
            used_count: 10,
            ..percentage_voucher(10)?
        };

        let error = voucher
            .discount_for(10_000, Timestamp::now())
            .err()
            .ok_or("expected exhausted voucher to fail")?;

        assert_eq!(error, VoucherError::Exhausted);
        assert!(error.is_capacity());

        Ok(())
    }

    #[test]
    fn inactive_voucher_is_rejected() -> TestResult {
        let voucher = Voucher {
            active: false,
            ..percentage_voucher(10)?
        };

        assert_eq!(
            voucher.check_eligibility(10_000, Timestamp::now()),
            Err(VoucherError::Inactive)
        );

        Ok(())
    }

    #[test]
    fn validity_window_is_enforced() -> TestResult {
        let now = Timestamp::now();

        let upcoming = Voucher {
            starts_at: Some(now.checked_add(1.hour())?),
            ..percentage_voucher(10)?
        };

        let expired = Voucher {
            ends_at: Some(now),
            ..percentage_voucher(10)?
        };

        assert_eq!(
            upcoming.check_eligibility(10_000, now),
            Err(VoucherError::NotYetValid)
        );
        assert_eq!(
            expired.check_eligibility(10_000, now),
            Err(VoucherError::Expired)
        );

        Ok(())
    }

    #[test]
    fn discount_values_are_validated() {
        assert_eq!(
            VoucherDiscount::Percentage(Decimal::ZERO).validate(),
            Err(VoucherError::InvalidPercentage)
        );
        assert_eq!(
            VoucherDiscount::Percentage(Decimal::from(101)).validate(),
            Err(VoucherError::InvalidPercentage)
        );
        assert_eq!(
            VoucherDiscount::FixedAmount(0).validate(),
            Err(VoucherError::InvalidAmount)
        );
        assert!(VoucherDiscount::Percentage(Decimal::from(100)).validate().is_ok());
    }

    #[test]
    fn unlimited_voucher_has_no_remaining_count() -> TestResult {
        let voucher = Voucher {
            max_uses: None,
            used_count: 1_000,
            ..percentage_voucher(10)?
        };

        assert_eq!(voucher.remaining_uses(), None);
        assert!(voucher.check_eligibility(10_000, Timestamp::now()).is_ok());

        Ok(())
    }
}
