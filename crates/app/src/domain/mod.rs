//! Soko Domain Concerns

pub mod flash_sales;
pub mod orders;
pub mod payments;
pub mod products;
pub mod vouchers;
