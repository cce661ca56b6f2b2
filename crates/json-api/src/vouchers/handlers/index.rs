//! Voucher Index Handler

use std::{string::ToString, sync::Arc};

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use soko::vouchers::VoucherDiscount;
use soko_app::domain::vouchers::records::VoucherRecord;
use uuid::Uuid;

use crate::{extensions::*, state::State, vouchers::errors::into_status_error};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VoucherResponse {
    pub uuid: Uuid,

    /// Upper-cased code customers enter at checkout
    pub code: String,

    /// `percentage` or `fixed_amount`
    pub discount_type: String,

    /// Percent off for percentage vouchers, minor units off for fixed ones
    pub discount_value: String,

    pub minimum_purchase_amount: Option<u64>,

    pub max_uses: Option<u32>,

    pub used_count: u32,

    /// Redemptions left, absent when unlimited
    pub remaining_uses: Option<u32>,

    pub active: bool,

    pub starts_at: Option<String>,

    pub ends_at: Option<String>,

    pub created_at: String,

    pub updated_at: String,
}

impl From<VoucherRecord> for VoucherResponse {
    fn from(record: VoucherRecord) -> Self {
        let voucher = record.voucher;

        let discount_value = match voucher.discount {
            VoucherDiscount::Percentage(percent) => percent.normalize().to_string(),
            VoucherDiscount::FixedAmount(amount) => amount.to_string(),
        };

        VoucherResponse {
            uuid: record.uuid.into(),
            discount_type: voucher.discount.type_as_str().to_string(),
            discount_value,
            minimum_purchase_amount: voucher.minimum_purchase_amount,
            max_uses: voucher.max_uses,
            used_count: voucher.used_count,
            remaining_uses: voucher.remaining_uses(),
            active: voucher.active,
            starts_at: voucher.starts_at.as_ref().map(ToString::to_string),
            ends_at: voucher.ends_at.as_ref().map(ToString::to_string),
            code: voucher.code.into(),
            created_at: record.created_at.to_string(),
            updated_at: record.updated_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VouchersResponse {
    pub vouchers: Vec<VoucherResponse>,
}

/// Voucher Index Handler
///
/// Every voucher, newest first.
#[endpoint(
    tags("vouchers"),
    summary = "List Vouchers",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<VouchersResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let vouchers = state
        .app
        .vouchers
        .list_vouchers()
        .await
        .map_err(into_status_error)?;

    Ok(Json(VouchersResponse {
        vouchers: vouchers.into_iter().map(Into::into).collect(),
    }))
}
