//! Soko
//!
//! Order, payment and pricing workflow core for the Soko storefront: cart
//! pricing with vouchers, shipping and tax, the flash-sale inventory guard,
//! order and payment state machines, and mobile-money transaction code
//! extraction. Nothing in this crate performs I/O.

pub mod cart;
pub mod flash_sales;
pub mod lifecycle;
pub mod money;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod vouchers;
