//! Vouchers Data

use jiff::Timestamp;
use soko::vouchers::{VoucherCode, VoucherDiscount};

use crate::domain::vouchers::records::VoucherUuid;

/// New Voucher Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVoucher {
    pub uuid: VoucherUuid,
    pub code: VoucherCode,
    pub discount: VoucherDiscount,
    pub minimum_purchase_amount: Option<u64>,
    pub max_uses: Option<u32>,
    pub active: bool,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
}
