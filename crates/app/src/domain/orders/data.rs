//! Order Data

use soko::{orders::PaymentMethod, vouchers::VoucherCode};

use crate::domain::{
    flash_sales::records::FlashSaleUuid,
    orders::records::{CustomerContact, OrderUuid},
    products::records::ProductUuid,
};

/// A cart line as sent at checkout, carrying the unit price captured when
/// the item was added to the cart. Later catalog edits do not reprice it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product: ProductUuid,
    pub flash_sale: Option<FlashSaleUuid>,
    pub quantity: u32,
    pub unit_price: u64,
}

/// New Order
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub lines: Vec<CheckoutLine>,
    pub customer: CustomerContact,
    pub shipping_address: String,
    pub voucher_code: Option<VoucherCode>,
    pub payment_method: PaymentMethod,
}
