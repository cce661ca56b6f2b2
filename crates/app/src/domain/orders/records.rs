//! Order Records

use jiff::Timestamp;
use soko::{
    orders::{OrderStatus, PaymentMethodKind},
    pricing::Quote,
};

use crate::{
    auth::UserUuid,
    domain::{
        flash_sales::records::FlashSaleUuid, products::records::ProductUuid,
        vouchers::records::VoucherUuid,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<OrderRecord>;

/// Order Line UUID
pub type OrderLineUuid = TypedUuid<OrderLineRecord>;

/// Who the order is for and how to reach them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerContact {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Order Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub customer: CustomerContact,
    pub shipping_address: String,
    pub payment_method: PaymentMethodKind,
    pub voucher_uuid: Option<VoucherUuid>,
    pub amounts: Quote,
    pub status: OrderStatus,
    pub lines: Vec<OrderLineRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OrderRecord {
    /// Lines bought at a flash-sale price, with their sale and quantity.
    pub fn flash_sale_claims(&self) -> impl Iterator<Item = (FlashSaleUuid, u32)> + '_ {
        self.lines
            .iter()
            .filter_map(|line| line.flash_sale_uuid.map(|sale| (sale, line.quantity)))
    }
}

/// One product line of an order, priced at submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineRecord {
    pub uuid: OrderLineUuid,
    pub order_uuid: OrderUuid,
    pub product_uuid: ProductUuid,
    pub flash_sale_uuid: Option<FlashSaleUuid>,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
}
