//! Cart

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors related to cart construction or totals.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// Line at the given index has a quantity below one.
    #[error("line {0} has a quantity below 1")]
    InvalidQuantity(usize),

    /// Line at the given index was not found.
    #[error("line {0} does not exist")]
    UnknownLine(usize),

    /// Subtotal does not fit in a minor-unit amount.
    #[error("cart subtotal overflowed")]
    Overflow,
}

/// A single product line, priced at the moment it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Product being bought.
    pub product: Uuid,

    /// Flash sale the line was added under, if any.
    pub flash_sale: Option<Uuid>,

    /// Number of units.
    pub quantity: u32,

    /// Unit price captured at add-time, in minor units.
    pub unit_price: u64,
}

impl CartLine {
    /// Create a line for a regular catalog product.
    pub fn new(product: Uuid, quantity: u32, unit_price: u64) -> Self {
        Self {
            product,
            flash_sale: None,
            quantity,
            unit_price,
        }
    }

    /// Create a line bought under a flash sale.
    pub fn on_sale(product: Uuid, flash_sale: Uuid, quantity: u32, sale_price: u64) -> Self {
        Self {
            product,
            flash_sale: Some(flash_sale),
            quantity,
            unit_price: sale_price,
        }
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the product does not fit in a `u64`.
    pub fn line_total(&self) -> Result<u64, CartError> {
        self.unit_price
            .checked_mul(u64::from(self.quantity))
            .ok_or(CartError::Overflow)
    }
}

/// Cart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart with the given lines.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for the first line with a zero quantity.
    pub fn with_lines(lines: impl Into<Vec<CartLine>>) -> Result<Self, CartError> {
        let lines = lines.into();

        if let Some(index) = lines.iter().position(|line| line.quantity == 0) {
            return Err(CartError::InvalidQuantity(index));
        }

        Ok(Self { lines })
    }

    /// Add a line. Adding the same product under the same sale again bumps the
    /// quantity of the existing line and keeps its captured price.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `line.quantity` is zero.
    pub fn add(&mut self, line: CartLine) -> Result<(), CartError> {
        if line.quantity == 0 {
            return Err(CartError::InvalidQuantity(self.lines.len()));
        }

        let existing = self
            .lines
            .iter_mut()
            .find(|existing| existing.product == line.product && existing.flash_sale == line.flash_sale);

        match existing {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            None => self.lines.push(line),
        }

        Ok(())
    }

    /// Change the quantity of a line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::UnknownLine`]: there is no line at `index`.
    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(index));
        }

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::UnknownLine(index))?;

        line.quantity = quantity;

        Ok(())
    }

    /// Remove a line, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownLine`] if there is no line at `index`.
    pub fn remove(&mut self, index: usize) -> Result<CartLine, CartError> {
        if index >= self.lines.len() {
            return Err(CartError::UnknownLine(index));
        }

        Ok(self.lines.remove(index))
    }

    /// Sum of every line total.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Overflow`] if the sum does not fit in a `u64`.
    pub fn subtotal(&self) -> Result<u64, CartError> {
        self.lines.iter().try_fold(0_u64, |acc, line| {
            acc.checked_add(line.line_total()?)
                .ok_or(CartError::Overflow)
        })
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn test_lines() -> [CartLine; 3] {
        [
            CartLine::new(Uuid::now_v7(), 1, 2_500),
            CartLine::new(Uuid::now_v7(), 2, 1_000),
            CartLine::new(Uuid::now_v7(), 3, 1_500),
        ]
    }

    #[test]
    fn subtotal_multiplies_quantity() -> TestResult {
        let cart = Cart::with_lines(test_lines())?;

        assert_eq!(cart.subtotal()?, 9_000);
        assert_eq!(cart.len(), 3);

        Ok(())
    }

    #[test]
    fn empty_cart_has_zero_subtotal() -> TestResult {
        let cart = Cart::new();

        assert!(cart.is_empty());
        assert_eq!(cart.subtotal()?, 0);

        Ok(())
    }

    #[test]
    fn with_lines_rejects_zero_quantity() {
        let lines = [
            CartLine::new(Uuid::now_v7(), 1, 100),
            CartLine::new(Uuid::now_v7(), 0, 100),
        ];

        assert_eq!(Cart::with_lines(lines), Err(CartError::InvalidQuantity(1)));
    }

    #[test]
    fn adding_same_product_keeps_captured_price() -> TestResult {
        let product = Uuid::now_v7();
        let mut cart = Cart::new();

        cart.add(CartLine::new(product, 1, 1_000))?;
        cart.add(CartLine::new(product, 2, 1_200))?;

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal()?, 3_000);

        Ok(())
    }

    #[test]
    fn sale_line_is_kept_apart_from_regular_line() -> TestResult {
        let product = Uuid::now_v7();
        let mut cart = Cart::new();

        cart.add(CartLine::new(product, 1, 1_000))?;
        cart.add(CartLine::on_sale(product, Uuid::now_v7(), 1, 700))?;

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal()?, 1_700);

        Ok(())
    }

    #[test]
    fn set_quantity_and_remove() -> TestResult {
        let mut cart = Cart::with_lines(test_lines())?;

        cart.set_quantity(0, 2)?;
        let removed = cart.remove(2)?;

        assert_eq!(removed.quantity, 3);
        assert_eq!(cart.subtotal()?, 7_000);
        assert_eq!(cart.set_quantity(0, 0), Err(CartError::InvalidQuantity(0)));
        assert_eq!(cart.remove(5), Err(CartError::UnknownLine(5)));

        Ok(())
    }

    #[test]
    fn subtotal_overflow_is_reported() -> TestResult {
        let cart = Cart::with_lines([CartLine::new(Uuid::now_v7(), 2, u64::MAX)])?;

        assert_eq!(cart.subtotal(), Err(CartError::Overflow));

        Ok(())
    }
}
