//! Products Data

use crate::domain::products::records::ProductUuid;

/// New Product Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub name: String,
    pub category: String,
    pub price: u64,
    pub original_price: Option<u64>,
    pub in_stock: bool,
}

/// Product Update Data
///
/// Orders capture the price at submission, so updates never reach existing orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductUpdate {
    pub name: String,
    pub category: String,
    pub price: u64,
    pub original_price: Option<u64>,
    pub in_stock: bool,
}
