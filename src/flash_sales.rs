//! Flash Sales
//!
//! A flash sale is a time-boxed, optionally inventory-capped price override on
//! a product. The checks in this module are advisory: they decide whether a
//! customer may add a sale item to their cart. The authoritative inventory
//! check happens when a payment is confirmed and `sold_quantity` is incremented
//! with a conditional update.

use std::fmt;

use jiff::{SignedDuration, Timestamp};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when creating or buying from a flash sale.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FlashSaleError {
    /// Sale price must be above zero and below the original price.
    #[error("sale price {sale_price} must be above 0 and below original price {original_price}")]
    InvalidPrice {
        /// Catalog price of the product.
        original_price: u64,
        /// Requested sale price.
        sale_price: u64,
    },

    /// The sale must end after it starts.
    #[error("flash sale must end after it starts")]
    InvalidWindow,

    /// Inactive, not started or already ended.
    #[error("flash sale is not live")]
    NotLive,

    /// Nothing left to sell.
    #[error("flash sale is sold out")]
    SoldOut,

    /// Fewer units left than requested.
    #[error("requested {requested} units but only {available} left")]
    InsufficientQuantity {
        /// Units asked for.
        requested: u32,
        /// Units still unsold.
        available: u32,
    },

    /// Quantity must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

impl FlashSaleError {
    /// Whether this failure is caused by exhausted inventory rather than bad input.
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::SoldOut | Self::InsufficientQuantity { .. })
    }
}

/// Percentage saved by buying at `sale_price`, rounded to a whole percent.
///
/// # Errors
///
/// Returns [`FlashSaleError::InvalidPrice`] unless `0 < sale_price < original_price`.
pub fn discount_percentage(original_price: u64, sale_price: u64) -> Result<u8, FlashSaleError> {
    let invalid = FlashSaleError::InvalidPrice {
        original_price,
        sale_price,
    };

    if sale_price == 0 || sale_price >= original_price {
        return Err(invalid);
    }

    let saved = Decimal::from(original_price - sale_price);
    let original = Decimal::from(original_price);

    (saved * Decimal::ONE_HUNDRED)
        .checked_div(original)
        .map(|percent| percent.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|percent| percent.to_u8())
        .ok_or(invalid)
}

/// A time-boxed price override on one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashSale {
    /// Product on sale.
    pub product: Uuid,

    /// Regular price in minor units.
    pub original_price: u64,

    /// Sale price in minor units.
    pub sale_price: u64,

    /// Start of the sale, inclusive.
    pub starts_at: Timestamp,

    /// End of the sale, exclusive.
    pub ends_at: Timestamp,

    /// Units that may be sold, unlimited when `None`.
    pub quantity_limit: Option<u32>,

    /// Units sold so far (confirmed orders only).
    pub sold_quantity: u32,

    /// Whether the sale is switched on.
    pub active: bool,
}

impl FlashSale {
    /// Check prices and window are coherent.
    ///
    /// # Errors
    ///
    /// - [`FlashSaleError::InvalidPrice`]: sale price not strictly between zero and original.
    /// - [`FlashSaleError::InvalidWindow`]: `ends_at` is not after `starts_at`.
    pub fn validate(&self) -> Result<(), FlashSaleError> {
        discount_percentage(self.original_price, self.sale_price)?;

        if self.ends_at <= self.starts_at {
            return Err(FlashSaleError::InvalidWindow);
        }

        Ok(())
    }

    /// Derived percentage saved.
    ///
    /// # Errors
    ///
    /// See [`discount_percentage`].
    pub fn discount_percentage(&self) -> Result<u8, FlashSaleError> {
        discount_percentage(self.original_price, self.sale_price)
    }

    /// Units left to sell, `None` when the sale is unlimited.
    pub fn available(&self) -> Option<u32> {
        self.quantity_limit
            .map(|limit| limit.saturating_sub(self.sold_quantity))
    }

    /// Active and inside its window.
    pub fn is_live(&self, now: Timestamp) -> bool {
        self.active && self.starts_at <= now && now < self.ends_at
    }

    /// Advisory check used when adding a sale item to a cart.
    ///
    /// # Errors
    ///
    /// - [`FlashSaleError::InvalidQuantity`]: `quantity` is zero.
    /// - [`FlashSaleError::NotLive`]: inactive or outside the window.
    /// - [`FlashSaleError::SoldOut`]: no units left.
    /// - [`FlashSaleError::InsufficientQuantity`]: fewer units left than requested.
    pub fn check_purchase(&self, quantity: u32, now: Timestamp) -> Result<(), FlashSaleError> {
        if quantity == 0 {
            return Err(FlashSaleError::InvalidQuantity);
        }

        if !self.is_live(now) {
            return Err(FlashSaleError::NotLive);
        }

        match self.available() {
            Some(0) => Err(FlashSaleError::SoldOut),
            Some(available) if quantity > available => Err(FlashSaleError::InsufficientQuantity {
                requested: quantity,
                available,
            }),
            Some(_) | None => Ok(()),
        }
    }

    /// Whether selling `quantity` more units keeps `sold_quantity` within the limit.
    ///
    /// Mirrors the conditional update that claims inventory in the store.
    pub fn can_claim(&self, quantity: u32) -> bool {
        match self.quantity_limit {
            None => true,
            Some(limit) => self
                .sold_quantity
                .checked_add(quantity)
                .is_some_and(|sold| sold <= limit),
        }
    }

    /// Time left before the sale ends, `None` once it has ended.
    pub fn time_remaining(&self, now: Timestamp) -> Option<Countdown> {
        let remaining = self.ends_at.duration_since(now);

        (remaining > SignedDuration::ZERO).then(|| Countdown::new(remaining))
    }
}

/// Coarse countdown shown next to a sale, e.g. `2d 3h 15m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Whole days left.
    pub days: i64,

    /// Hours left after whole days.
    pub hours: i64,

    /// Minutes left after whole hours.
    pub minutes: i64,
}

impl Countdown {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * Self::MINUTE;
    const DAY: i64 = 24 * Self::HOUR;

    fn new(remaining: SignedDuration) -> Self {
        let seconds = remaining.as_secs();

        Self {
            days: seconds / Self::DAY,
            hours: (seconds % Self::DAY) / Self::HOUR,
            minutes: (seconds % Self::HOUR) / Self::MINUTE,
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}d {}h {}m", self.days, self.hours, self.minutes)
        } else if self.hours > 0 {
            write!(f, "{}h {}m", self.hours, self.minutes)
        } else {
            write!(f, "{}m", self.minutes)
        }
    }
}
