//! Flash Sale Records

use jiff::Timestamp;
use soko::flash_sales::{Countdown, FlashSale};

use crate::{domain::products::records::ProductUuid, uuids::TypedUuid};

/// Flash Sale UUID
pub type FlashSaleUuid = TypedUuid<FlashSaleRecord>;

/// Flash Sale Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashSaleRecord {
    pub uuid: FlashSaleUuid,
    pub sale: FlashSale,
    pub discount_percentage: u8,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl FlashSaleRecord {
    /// Product on sale.
    #[must_use]
    pub fn product_uuid(&self) -> ProductUuid {
        ProductUuid::from_uuid(self.sale.product)
    }
}

/// Advisory availability of a flash sale at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashSaleAvailability {
    pub uuid: FlashSaleUuid,
    pub live: bool,
    pub available: Option<u32>,
    pub sold_quantity: u32,
    pub time_remaining: Option<Countdown>,
}
