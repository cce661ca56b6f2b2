//! Product Records

use jiff::Timestamp;

use crate::uuids::TypedUuid;

/// Product UUID
pub type ProductUuid = TypedUuid<ProductRecord>;

/// Product Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRecord {
    pub uuid: ProductUuid,
    pub name: String,
    pub category: String,
    pub price: u64,
    pub original_price: Option<u64>,
    pub in_stock: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
