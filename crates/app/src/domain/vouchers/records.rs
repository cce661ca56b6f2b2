//! Voucher Records

use jiff::Timestamp;
use soko::vouchers::Voucher;

use crate::{
    auth::UserUuid,
    domain::orders::records::OrderUuid,
    uuids::TypedUuid,
};

/// Voucher UUID
pub type VoucherUuid = TypedUuid<VoucherRecord>;

/// Voucher Usage UUID
pub type VoucherUsageUuid = TypedUuid<VoucherUsageRecord>;

/// Voucher Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherRecord {
    pub uuid: VoucherUuid,
    pub voucher: Voucher,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One redemption of a voucher by an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherUsageRecord {
    pub uuid: VoucherUsageUuid,
    pub voucher_uuid: VoucherUuid,
    pub order_uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub discount_amount: u64,
    pub used_at: Timestamp,
}
