//! Voucher Usages Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use soko_app::domain::vouchers::records::VoucherUsageRecord;
use uuid::Uuid;

use crate::{extensions::*, state::State, vouchers::errors::into_status_error};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VoucherUsageResponse {
    pub uuid: Uuid,
    pub order_uuid: Uuid,
    pub user_uuid: Uuid,
    /// Discount granted to the order, in minor units
    pub discount_amount: u64,
    pub used_at: String,
}

impl From<VoucherUsageRecord> for VoucherUsageResponse {
    fn from(usage: VoucherUsageRecord) -> Self {
        VoucherUsageResponse {
            uuid: usage.uuid.into(),
            order_uuid: usage.order_uuid.into(),
            user_uuid: usage.user_uuid.into(),
            discount_amount: usage.discount_amount,
            used_at: usage.used_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct VoucherUsagesResponse {
    pub usages: Vec<VoucherUsageResponse>,
}

/// Redemptions of a voucher, newest first.
#[endpoint(
    tags("vouchers"),
    summary = "List Voucher Usages",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Voucher usages"),
        (status_code = StatusCode::NOT_FOUND, description = "Voucher not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin role required"),
    ),
)]
pub(crate) async fn handler(
    voucher: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<VoucherUsagesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let usages = state
        .app
        .vouchers
        .list_voucher_usages(voucher.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(VoucherUsagesResponse {
        usages: usages.into_iter().map(Into::into).collect(),
    }))
}
