//! Flash Sales Data

use jiff::Timestamp;

use crate::domain::{flash_sales::records::FlashSaleUuid, products::records::ProductUuid};

/// New Flash Sale Data
///
/// The original price is taken from the product's catalog price when the sale is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlashSale {
    pub uuid: FlashSaleUuid,
    pub product: ProductUuid,
    pub sale_price: u64,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub quantity_limit: Option<u32>,
    pub active: bool,
}
